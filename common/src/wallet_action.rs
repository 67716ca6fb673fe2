use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a wallet movement as seen by the hub.
///
/// Shared between the ingress handlers, the Operator gateway payload builder
/// and the RGS payload builder so the two translation tables (hub -> Operator,
/// Operator -> hub) live next to the enum they translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "wallet_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WalletAction {
    Debit,
    Credit,
}

impl WalletAction {
    /// Verb used on the Operator's `/v2/players/{id}/{verb}` endpoint.
    pub fn operator_verb(self) -> &'static str {
        match self {
            WalletAction::Debit => "withdraw",
            WalletAction::Credit => "deposit",
        }
    }

    /// Reverse mapping: Operator verb -> hub direction, used when translating
    /// an incoming webhook callback back into the hub's vocabulary.
    pub fn from_operator_verb(verb: &str) -> Option<Self> {
        match verb {
            "withdraw" => Some(WalletAction::Debit),
            "deposit" => Some(WalletAction::Credit),
            _ => None,
        }
    }
}

impl fmt::Display for WalletAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletAction::Debit => write!(f, "debit"),
            WalletAction::Credit => write!(f, "credit"),
        }
    }
}

impl FromStr for WalletAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(WalletAction::Debit),
            "credit" => Ok(WalletAction::Credit),
            other => Err(format!("unknown wallet action '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_operator_verb_and_back() {
        assert_eq!(WalletAction::Debit.operator_verb(), "withdraw");
        assert_eq!(WalletAction::Credit.operator_verb(), "deposit");
        assert_eq!(
            WalletAction::from_operator_verb("withdraw"),
            Some(WalletAction::Debit)
        );
        assert_eq!(
            WalletAction::from_operator_verb("deposit"),
            Some(WalletAction::Credit)
        );
        assert_eq!(WalletAction::from_operator_verb("transfer"), None);
    }

    #[test]
    fn parses_from_str() {
        assert_eq!("debit".parse::<WalletAction>().unwrap(), WalletAction::Debit);
        assert!("withdraw".parse::<WalletAction>().is_err());
    }
}
