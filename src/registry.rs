//! Agent directory: the registry that gates every other write.
//!
//! Agents register exactly once under a caller-chosen id and pay a flat
//! fee into the directory's treasury account. All other stores consult
//! [`AgentDirectory::exists`] before accepting a write that references an
//! agent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::{notify, EventHandler, LedgerEvent};
use crate::token::{TokenError, TokenLedger};
use crate::types::{Address, AgentId, Amount};

/// Default one-time registration fee, in token base units.
pub const DEFAULT_REGISTRATION_FEE: Amount = 10;

/// A registered network participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Agent {
    pub id: AgentId,
    /// Identity that paid the registration fee.
    pub owner: Address,
    pub name: String,
    pub role: String,
    pub capabilities: String,
    /// Starts at zero; reserved for future reputation extensions.
    pub reputation_score: u64,
}

/// Registry operation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The caller-chosen id is already taken.
    #[error("agent {0} is already registered")]
    AlreadyRegistered(AgentId),

    /// The payer cannot cover the registration fee.
    #[error("registration fee not covered: {0}")]
    InsufficientFunds(#[from] TokenError),

    /// No agent under that id.
    #[error("agent {0} not found")]
    NotFound(AgentId),
}

/// Registry of participants, keyed by caller-chosen id.
pub struct AgentDirectory {
    agents: HashMap<AgentId, Agent>,
    fee: Amount,
    treasury: Address,
    observers: Vec<EventHandler>,
}

impl AgentDirectory {
    /// Create a directory collecting `fee` into the `treasury` account.
    pub fn new(fee: Amount, treasury: Address) -> Self {
        Self {
            agents: HashMap::new(),
            fee,
            treasury,
            observers: Vec::new(),
        }
    }

    /// Register an observer invoked after each successful registration.
    pub fn subscribe(&mut self, observer: EventHandler) {
        self.observers.push(observer);
    }

    /// Register a new agent.
    ///
    /// Checks, in order: the id must be free, then the payer must cover
    /// the fee. On success the fee moves from `payer` to the treasury,
    /// the agent is stored with a zero reputation score, and
    /// [`LedgerEvent::AgentRegistered`] is emitted.
    pub fn register(
        &mut self,
        id: AgentId,
        name: impl Into<String>,
        role: impl Into<String>,
        capabilities: impl Into<String>,
        payer: Address,
        token: &mut TokenLedger,
    ) -> Result<Agent, RegistryError> {
        if self.agents.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        token.transfer(payer, self.treasury, self.fee)?;

        let agent = Agent {
            id,
            owner: payer,
            name: name.into(),
            role: role.into(),
            capabilities: capabilities.into(),
            reputation_score: 0,
        };
        self.agents.insert(id, agent.clone());
        tracing::debug!(agent_id = id, owner = %payer, fee = self.fee, "agent registered");

        notify(
            &self.observers,
            &LedgerEvent::AgentRegistered {
                agent_id: id,
                owner: payer,
                name: agent.name.clone(),
                fee_paid: self.fee,
            },
        );
        Ok(agent)
    }

    /// Look up an agent by id.
    pub fn get(&self, id: AgentId) -> Result<&Agent, RegistryError> {
        self.agents.get(&id).ok_or(RegistryError::NotFound(id))
    }

    /// No-fail existence check used by the dependent stores.
    pub fn exists(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// The flat registration fee.
    pub fn registration_fee(&self) -> Amount {
        self.fee
    }

    /// The account collecting registration fees.
    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn total_agents(&self) -> usize {
        self.agents.len()
    }
}
