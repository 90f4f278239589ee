//! Fork rules and interpreter configuration

use crate::gas::cost;
use std::fmt;
use std::str::FromStr;

/// Activation flags for the hard forks the interpreter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Homestead: DELEGATECALL, code-store failure on out-of-gas
    pub is_homestead: bool,
    /// Tangerine Whistle: IO repricing and the 63/64 call gas rule
    pub is_eip150: bool,
    /// Spurious Dragon: state clearing, EXP repricing, max code size
    pub is_eip158: bool,
    /// Byzantium: REVERT, STATICCALL, return data opcodes
    pub is_byzantium: bool,
    /// Constantinople: bitwise shifts
    pub is_constantinople: bool,
}

impl Rules {
    /// Frontier
    pub const fn frontier() -> Self {
        Self {
            is_homestead: false,
            is_eip150: false,
            is_eip158: false,
            is_byzantium: false,
            is_constantinople: false,
        }
    }

    /// Homestead
    pub const fn homestead() -> Self {
        Self {
            is_homestead: true,
            ..Self::frontier()
        }
    }

    /// Tangerine Whistle
    pub const fn tangerine_whistle() -> Self {
        Self {
            is_eip150: true,
            ..Self::homestead()
        }
    }

    /// Spurious Dragon
    pub const fn spurious_dragon() -> Self {
        Self {
            is_eip158: true,
            ..Self::tangerine_whistle()
        }
    }

    /// Byzantium
    pub const fn byzantium() -> Self {
        Self {
            is_byzantium: true,
            ..Self::spurious_dragon()
        }
    }

    /// Constantinople
    pub const fn constantinople() -> Self {
        Self {
            is_constantinople: true,
            ..Self::byzantium()
        }
    }

    /// Whether deployed code over [`cost::MAX_CODE_SIZE`] is rejected
    pub const fn max_code_size_enforced(&self) -> bool {
        self.is_eip158
    }

    /// Whether running out of gas while storing created code fails the create
    pub const fn code_store_failure(&self) -> bool {
        self.is_homestead
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::constantinople()
    }
}

/// Named hard fork
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Fork {
    /// Frontier
    Frontier,
    /// Homestead
    Homestead,
    /// Tangerine Whistle (EIP-150)
    TangerineWhistle,
    /// Spurious Dragon (EIP-158)
    SpuriousDragon,
    /// Byzantium
    Byzantium,
    /// Constantinople
    Constantinople,
}

impl Fork {
    /// All forks, oldest first
    pub const ALL: [Fork; 6] = [
        Fork::Frontier,
        Fork::Homestead,
        Fork::TangerineWhistle,
        Fork::SpuriousDragon,
        Fork::Byzantium,
        Fork::Constantinople,
    ];

    /// Rules active from this fork on
    pub const fn rules(self) -> Rules {
        match self {
            Fork::Frontier => Rules::frontier(),
            Fork::Homestead => Rules::homestead(),
            Fork::TangerineWhistle => Rules::tangerine_whistle(),
            Fork::SpuriousDragon => Rules::spurious_dragon(),
            Fork::Byzantium => Rules::byzantium(),
            Fork::Constantinople => Rules::constantinople(),
        }
    }

    /// Lowercase name used in config files
    pub const fn as_str(self) -> &'static str {
        match self {
            Fork::Frontier => "frontier",
            Fork::Homestead => "homestead",
            Fork::TangerineWhistle => "tangerine",
            Fork::SpuriousDragon => "spurious",
            Fork::Byzantium => "byzantium",
            Fork::Constantinople => "constantinople",
        }
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Fork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Fork::ALL
            .into_iter()
            .find(|fork| fork.as_str() == lower)
            .ok_or_else(|| format!("unknown fork: {}", s))
    }
}

/// Fork activation block numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Homestead activation
    pub homestead_block: Option<u64>,
    /// EIP-150 activation
    pub eip150_block: Option<u64>,
    /// EIP-158 activation
    pub eip158_block: Option<u64>,
    /// Byzantium activation
    pub byzantium_block: Option<u64>,
    /// Constantinople activation
    pub constantinople_block: Option<u64>,
}

impl ChainConfig {
    /// Ethereum mainnet schedule
    pub fn mainnet() -> Self {
        Self {
            homestead_block: Some(1_150_000),
            eip150_block: Some(2_463_000),
            eip158_block: Some(2_675_000),
            byzantium_block: Some(4_370_000),
            constantinople_block: Some(7_280_000),
        }
    }

    /// Every fork active from genesis
    pub fn all_active() -> Self {
        Self {
            homestead_block: Some(0),
            eip150_block: Some(0),
            eip158_block: Some(0),
            byzantium_block: Some(0),
            constantinople_block: Some(0),
        }
    }

    /// Rules in effect at block `number`
    pub fn rules(&self, number: u64) -> Rules {
        let active = |block: Option<u64>| block.is_some_and(|b| number >= b);
        Rules {
            is_homestead: active(self.homestead_block),
            is_eip150: active(self.eip150_block),
            is_eip158: active(self.eip158_block),
            is_byzantium: active(self.byzantium_block),
            is_constantinople: active(self.constantinople_block),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::all_active()
    }
}

/// Interpreter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmConfig {
    /// Fork rules
    pub rules: Rules,
    /// Add overflow flags to tainted ADD/SUB/MUL/EXP results
    pub track_overflow: bool,
    /// Forward SHA3 preimages to the state store
    pub record_preimages: bool,
    /// Maximum nesting of call frames
    pub max_call_depth: usize,
}

impl EvmConfig {
    /// Configuration for a fork
    pub fn for_fork(fork: Fork) -> Self {
        Self {
            rules: fork.rules(),
            ..Self::default()
        }
    }

    /// Enable overflow tracking
    pub fn with_overflow_tracking(mut self, enabled: bool) -> Self {
        self.track_overflow = enabled;
        self
    }
}

impl Default for EvmConfig {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            track_overflow: false,
            record_preimages: false,
            max_call_depth: cost::MAX_CALL_DEPTH,
        }
    }
}
