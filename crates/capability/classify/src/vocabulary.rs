//! 两态词表：binary_sensor 与 switch 各自的 on/off 令牌集合。
//!
//! 两个词表共享 `0`/`1` 与 on/off 令牌：厂商两态枚举的原始键统一是 `0`/`1`，
//! 而原始键与标签都必须命中词表。其余令牌只属于其中一个词表。

/// binary_sensor 的 on 令牌。
pub const BINARY_SENSOR_ON: &[&str] = &[
    "1", "active", "Active", "on", "On", "ON", "true", "True", "TRUE", "yes", "Yes", "YES",
    "open", "Open", "OPEN", "opened", "Opened",
];

/// binary_sensor 的 off 令牌。
pub const BINARY_SENSOR_OFF: &[&str] = &[
    "0", "inactive", "Inactive", "off", "Off", "OFF", "false", "False", "FALSE", "no", "No", "NO",
    "closed", "Closed", "CLOSED",
];

/// switch 的 on 令牌。
pub const SWITCH_ON: &[&str] = &[
    "1", "on", "On", "ON", "enable", "Enable", "enabled", "Enabled",
];

/// switch 的 off 令牌。
pub const SWITCH_OFF: &[&str] = &[
    "0", "off", "Off", "OFF", "disable", "Disable", "disabled", "Disabled",
];

/// 两个词表共有的令牌。
pub const SHARED_TOKENS: &[&str] = &["0", "1", "on", "On", "ON", "off", "Off", "OFF"];

/// 两态词表。成员判断区分大小写。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    BinarySensor,
    Switch,
}

impl Vocabulary {
    pub fn on_tokens(&self) -> &'static [&'static str] {
        match self {
            Self::BinarySensor => BINARY_SENSOR_ON,
            Self::Switch => SWITCH_ON,
        }
    }

    pub fn off_tokens(&self) -> &'static [&'static str] {
        match self {
            Self::BinarySensor => BINARY_SENSOR_OFF,
            Self::Switch => SWITCH_OFF,
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.on_tokens().contains(&token) || self.off_tokens().contains(&token)
    }

    /// 令牌对应的开关状态；不在词表中返回 None（未知）。
    pub fn state_of(&self, token: &str) -> Option<bool> {
        if self.on_tokens().contains(&token) {
            Some(true)
        } else if self.off_tokens().contains(&token) {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_and_off_tokens_are_disjoint() {
        for vocabulary in [Vocabulary::BinarySensor, Vocabulary::Switch] {
            for token in vocabulary.on_tokens() {
                assert!(
                    !vocabulary.off_tokens().contains(token),
                    "{vocabulary:?} token {token} is both on and off"
                );
            }
        }
    }

    #[test]
    fn membership_is_case_sensitive() {
        assert!(Vocabulary::Switch.contains("On"));
        assert!(!Vocabulary::Switch.contains("oN"));
        assert_eq!(Vocabulary::BinarySensor.state_of("Active"), Some(true));
        assert_eq!(Vocabulary::BinarySensor.state_of("Closed"), Some(false));
        assert_eq!(Vocabulary::BinarySensor.state_of("closed"), Some(false));
        assert_eq!(Vocabulary::BinarySensor.state_of("Open"), Some(true));
        assert_eq!(Vocabulary::BinarySensor.state_of("Ajar"), None);
    }

    #[test]
    fn vocabularies_overlap_only_on_shared_tokens() {
        for token in BINARY_SENSOR_ON.iter().chain(BINARY_SENSOR_OFF) {
            assert_eq!(
                Vocabulary::Switch.contains(token),
                SHARED_TOKENS.contains(token),
                "binary sensor token {token}"
            );
        }
        for token in SWITCH_ON.iter().chain(SWITCH_OFF) {
            assert_eq!(
                Vocabulary::BinarySensor.contains(token),
                SHARED_TOKENS.contains(token),
                "switch token {token}"
            );
        }
    }

    #[test]
    fn shared_tokens_agree_on_state() {
        for token in SHARED_TOKENS {
            assert_eq!(
                Vocabulary::BinarySensor.state_of(token),
                Vocabulary::Switch.state_of(token)
            );
        }
    }
}
