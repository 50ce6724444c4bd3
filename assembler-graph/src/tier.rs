//! Production unit tiers and their crafting speeds

use clap::ValueEnum;

/// The kind of production unit every recipe in a chain is assumed to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MachineTier {
    /// Crafting by hand
    #[value(name = "0", alias = "hand")]
    Hand,
    #[value(name = "1")]
    Assembler1,
    #[value(name = "2")]
    Assembler2,
    #[value(name = "3")]
    Assembler3,
}

impl MachineTier {
    /// Multiplier applied to recipe speed (cycle time is divided by it).
    pub fn crafting_speed(self) -> f64 {
        match self {
            MachineTier::Hand => 1.0,
            MachineTier::Assembler1 => 0.5,
            MachineTier::Assembler2 => 0.75,
            MachineTier::Assembler3 => 1.25,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MachineTier::Hand => "hand crafting",
            MachineTier::Assembler1 => "assembling machine 1",
            MachineTier::Assembler2 => "assembling machine 2",
            MachineTier::Assembler3 => "assembling machine 3",
        }
    }
}

impl std::fmt::Display for MachineTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (speed {})", self.name(), self.crafting_speed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speeds_match_tiers() {
        assert_eq!(MachineTier::Hand.crafting_speed(), 1.0);
        assert_eq!(MachineTier::Assembler1.crafting_speed(), 0.5);
        assert_eq!(MachineTier::Assembler2.crafting_speed(), 0.75);
        assert_eq!(MachineTier::Assembler3.crafting_speed(), 1.25);
    }

    #[test]
    fn parses_numeric_choices() {
        assert_eq!(MachineTier::from_str("3", false).unwrap(), MachineTier::Assembler3);
        assert_eq!(MachineTier::from_str("hand", false).unwrap(), MachineTier::Hand);
        assert!(MachineTier::from_str("4", false).is_err());
    }

    #[test]
    fn display_names_speed() {
        assert_eq!(MachineTier::Assembler2.to_string(), "assembling machine 2 (speed 0.75)");
    }
}
