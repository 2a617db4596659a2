//! Resolution of oracle decisions into social actions.

use std::ops::Range;

use abyss_agents::{BioBit, DEFAULT_MESSAGE_DURATION_MS};
use abyss_types::{
    AgentId, ChatMessage, Decision, DecisionIntent, Intention, Position, SocialActionType,
};
use rand::Rng;

use super::Simulation;
use crate::social_log::{SocialExtras, create_social_event, is_lie};

/// Distance within which attacks and shares land.
pub const ENGAGE_RADIUS: f64 = 40.0;
/// Energy a socializing agent needs before it shares.
pub const SHARE_MIN_ENERGY: f64 = 30.0;
/// A socializing agent closer than this stays put instead of approaching.
pub const APPROACH_THRESHOLD: f64 = 30.0;
/// Speed when closing in on an attack target.
pub const CHASE_SPEED: f64 = 0.7;
/// Speed when approaching to socialize.
pub const APPROACH_SPEED: f64 = 0.5;
/// Speed when fleeing.
pub const FLEE_SPEED: f64 = 2.0;

const SILENT: &str = "...";
const ATTACK_DAMAGE: Range<f64> = 10.0..25.0;
const SHARE_AMOUNT: Range<f64> = 5.0..15.0;

impl Simulation {
    /// Apply `decision` to a living agent and act on the nearest of its
    /// sampled neighbours. Returns the intention that was set.
    pub(super) fn apply_decision(
        &mut self,
        agent_id: AgentId,
        nearby: &[AgentId],
        decision: &Decision,
        now: u64,
    ) -> Intention {
        let intention = Intention::from(decision.intention);
        let Some(agent) = self.agents.get_mut(agent_id) else {
            return intention;
        };
        agent.set_intention(intention);
        agent.set_monologue(decision.internal_monologue.as_str());
        agent.set_last_direction(decision.move_direction);

        let message = decision.public_message.trim();
        if !message.is_empty() && message != SILENT {
            agent.set_public_message(message, DEFAULT_MESSAGE_DURATION_MS, now);
            let chat = ChatMessage {
                id: self.ids.issue(),
                sender_id: agent_id,
                sender_name: agent.name().to_owned(),
                message: message.to_owned(),
                is_lie: is_lie(decision.intention, message),
                true_intention: decision.intention,
                position: agent.position(),
                timestamp: now,
            };
            tracing::debug!(agent_id = %agent_id, is_lie = chat.is_lie, "public message");
            self.log.push_chat(chat);
        }
        let origin = agent.position();

        let Some((target_id, distance)) = self.nearest_living(origin, nearby) else {
            return intention;
        };
        match decision.intention {
            DecisionIntent::Attack if distance < ENGAGE_RADIUS => {
                self.perform_attack(agent_id, target_id, now);
            }
            DecisionIntent::Attack => self.approach(agent_id, target_id, CHASE_SPEED, now),
            DecisionIntent::Socialize => {
                let energy = self.agents.get(agent_id).map_or(0.0, BioBit::energy);
                if distance < ENGAGE_RADIUS && energy > SHARE_MIN_ENERGY {
                    self.perform_share(agent_id, target_id, now);
                } else if distance > APPROACH_THRESHOLD {
                    self.approach(agent_id, target_id, APPROACH_SPEED, now);
                }
            }
            DecisionIntent::Flee => self.flee(agent_id, target_id, now),
            DecisionIntent::Hunt => {}
        }
        intention
    }

    /// The closest still-living agent among `candidates`. Ties keep the
    /// earlier candidate.
    fn nearest_living(&self, origin: Position, candidates: &[AgentId]) -> Option<(AgentId, f64)> {
        candidates
            .iter()
            .filter_map(|&id| self.agents.get(id))
            .filter(|other| other.is_alive())
            .map(|other| (other.id(), origin.distance_to(other.position())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn approach(&mut self, agent_id: AgentId, target_id: AgentId, speed: f64, now: u64) {
        let Some(target_pos) = self.agents.get(target_id).map(BioBit::position) else {
            return;
        };
        if let Some(agent) = self.agents.get_mut(agent_id) {
            agent.set_target(Some(target_id));
            agent.move_to(target_pos, speed, self.bounds, now, &mut self.rng);
        }
    }

    fn perform_attack(&mut self, attacker: AgentId, target: AgentId, now: u64) {
        let damage = self.rng.random_range(ATTACK_DAMAGE);
        let rng = &mut self.rng;
        let stolen = match self
            .agents
            .with_pair(attacker, target, |a, t| a.attack_target(t, damage, now, rng))
        {
            Ok(stolen) => stolen,
            Err(e) => {
                tracing::warn!(error = %e, "attack skipped");
                return;
            }
        };
        tracing::info!(attacker_id = %attacker, target_id = %target, stolen, "attack");
        self.record_social(
            SocialActionType::Attack,
            attacker,
            Some(target),
            SocialExtras {
                message: None,
                energy_transfer: Some(-stolen),
            },
            now,
        );
        self.stats.total_interactions = self.stats.total_interactions.saturating_add(1);
    }

    fn perform_share(&mut self, giver: AgentId, receiver: AgentId, now: u64) {
        let amount = self.rng.random_range(SHARE_AMOUNT);
        let rng = &mut self.rng;
        let shared = match self
            .agents
            .with_pair(giver, receiver, |g, r| g.share_energy(r, amount, now, rng))
        {
            Ok(shared) => shared,
            Err(e) => {
                tracing::warn!(error = %e, "share skipped");
                return;
            }
        };
        if shared <= 0.0 {
            return;
        }
        tracing::info!(giver_id = %giver, receiver_id = %receiver, shared, "share");
        self.record_social(
            SocialActionType::Share,
            giver,
            Some(receiver),
            SocialExtras {
                message: None,
                energy_transfer: Some(shared),
            },
            now,
        );
        self.stats.total_interactions = self.stats.total_interactions.saturating_add(1);
    }

    fn flee(&mut self, agent_id: AgentId, threat_id: AgentId, now: u64) {
        let Some(threat) = self.agents.get(threat_id) else {
            return;
        };
        let threat_pos = threat.position();
        let memory = format!("Fled from {}", threat.name());
        if let Some(agent) = self.agents.get_mut(agent_id) {
            agent.flee_from(threat_pos, FLEE_SPEED, self.bounds, now, &mut self.rng);
            agent.add_memory(now, memory, Some(threat_id));
        }
        tracing::debug!(agent_id = %agent_id, threat_id = %threat_id, "fled");
        self.record_social(
            SocialActionType::Flee,
            agent_id,
            Some(threat_id),
            SocialExtras::default(),
            now,
        );
    }

    fn record_social(
        &mut self,
        kind: SocialActionType,
        actor_id: AgentId,
        target_id: Option<AgentId>,
        extras: SocialExtras,
        now: u64,
    ) {
        let id = self.ids.issue();
        let Some(actor) = self.agents.get(actor_id) else {
            return;
        };
        let target = target_id.and_then(|t| self.agents.get(t));
        self.log
            .push_social(create_social_event(id, kind, actor, target, extras, now));
    }
}
