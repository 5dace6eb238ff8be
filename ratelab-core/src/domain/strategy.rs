//! Strategy configuration: token and protocol identities for up to four legs.

use serde::{Deserialize, Serialize};

/// Default distance from liquidation a strategy targets when sizing loans.
pub const DEFAULT_LIQUIDATION_DISTANCE: f64 = 0.20;

/// A token identity: display symbol plus on-chain contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRef {
    pub symbol: String,
    pub contract: String,
}

impl TokenRef {
    pub fn new(symbol: &str, contract: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            contract: contract.to_string(),
        }
    }
}

/// Which of the three configured tokens a leg trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenSlot {
    Token1,
    Token2,
    Token3,
}

impl TokenSlot {
    pub fn key(self) -> &'static str {
        match self {
            TokenSlot::Token1 => "token1",
            TokenSlot::Token2 => "token2",
            TokenSlot::Token3 => "token3",
        }
    }

    pub fn contract_key(self) -> &'static str {
        match self {
            TokenSlot::Token1 => "token1_contract",
            TokenSlot::Token2 => "token2_contract",
            TokenSlot::Token3 => "token3_contract",
        }
    }
}

/// Which of the two configured protocols a leg sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtocolSlot {
    A,
    B,
}

impl ProtocolSlot {
    pub fn key(self) -> &'static str {
        match self {
            ProtocolSlot::A => "protocol_a",
            ProtocolSlot::B => "protocol_b",
        }
    }
}

/// A tradeable strategy instance.
///
/// Which fields must be present depends on the strategy shape; see
/// [`StrategyShape::validate_config`](crate::legs::StrategyShape::validate_config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub strategy_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token1: Option<TokenRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token2: Option<TokenRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token3: Option<TokenRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_b: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidation_distance: Option<f64>,
}

impl StrategyConfig {
    pub fn new(strategy_type: &str) -> Self {
        Self {
            strategy_type: strategy_type.to_string(),
            token1: None,
            token2: None,
            token3: None,
            protocol_a: None,
            protocol_b: None,
            liquidation_distance: None,
        }
    }

    pub fn with_token(mut self, slot: TokenSlot, symbol: &str, contract: &str) -> Self {
        let token = Some(TokenRef::new(symbol, contract));
        match slot {
            TokenSlot::Token1 => self.token1 = token,
            TokenSlot::Token2 => self.token2 = token,
            TokenSlot::Token3 => self.token3 = token,
        }
        self
    }

    pub fn with_protocol(mut self, slot: ProtocolSlot, protocol: &str) -> Self {
        let protocol = Some(protocol.to_string());
        match slot {
            ProtocolSlot::A => self.protocol_a = protocol,
            ProtocolSlot::B => self.protocol_b = protocol,
        }
        self
    }

    pub fn with_liquidation_distance(mut self, distance: f64) -> Self {
        self.liquidation_distance = Some(distance);
        self
    }

    pub fn token(&self, slot: TokenSlot) -> Option<&TokenRef> {
        match slot {
            TokenSlot::Token1 => self.token1.as_ref(),
            TokenSlot::Token2 => self.token2.as_ref(),
            TokenSlot::Token3 => self.token3.as_ref(),
        }
    }

    pub fn protocol(&self, slot: ProtocolSlot) -> Option<&str> {
        match slot {
            ProtocolSlot::A => self.protocol_a.as_deref(),
            ProtocolSlot::B => self.protocol_b.as_deref(),
        }
    }

    pub fn liquidation_distance_or_default(&self) -> f64 {
        self.liquidation_distance
            .unwrap_or(DEFAULT_LIQUIDATION_DISTANCE)
    }

    /// Deterministic identity for this strategy instance.
    ///
    /// Hash of the canonical JSON encoding; struct field order is fixed, so
    /// two equal configs always produce the same id.
    pub fn strategy_id(&self) -> String {
        // Plain strings, options and f64 cannot fail to serialize.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().as_str()[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loop_config() -> StrategyConfig {
        StrategyConfig::new("recursive_lending")
            .with_token(TokenSlot::Token1, "USDC", "0xdba3::usdc::USDC")
            .with_token(TokenSlot::Token2, "SUI", "0x2::sui::SUI")
            .with_protocol(ProtocolSlot::A, "navi")
            .with_protocol(ProtocolSlot::B, "suilend")
    }

    #[test]
    fn liquidation_distance_defaults() {
        let c = loop_config();
        assert_eq!(c.liquidation_distance_or_default(), DEFAULT_LIQUIDATION_DISTANCE);
        let c = c.with_liquidation_distance(0.3);
        assert_eq!(c.liquidation_distance_or_default(), 0.3);
    }

    #[test]
    fn strategy_id_is_deterministic() {
        assert_eq!(loop_config().strategy_id(), loop_config().strategy_id());
        assert_eq!(loop_config().strategy_id().len(), 16);
    }

    #[test]
    fn strategy_id_changes_with_protocol() {
        let a = loop_config();
        let b = loop_config().with_protocol(ProtocolSlot::B, "scallop");
        assert_ne!(a.strategy_id(), b.strategy_id());
    }

    #[test]
    fn accessors_follow_slots() {
        let c = loop_config();
        assert_eq!(c.token(TokenSlot::Token2).map(|t| t.symbol.as_str()), Some("SUI"));
        assert!(c.token(TokenSlot::Token3).is_none());
        assert_eq!(c.protocol(ProtocolSlot::B), Some("suilend"));
    }

    #[test]
    fn deserializes_with_missing_optionals() {
        let c: StrategyConfig = serde_json::from_str(
            r#"{"strategy_type":"stablecoin_lending","token1":{"symbol":"USDC","contract":"0x1::usdc::USDC"},"protocol_a":"navi"}"#,
        )
        .unwrap();
        assert!(c.token2.is_none());
        assert!(c.liquidation_distance.is_none());
    }
}
