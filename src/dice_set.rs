use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Side counts of a standard polyhedral set, percentile die included.
pub const STANDARD_SIDES: [u32; 7] = [4, 6, 8, 10, 10, 12, 20];

/// Fewer faces leave no degrees of freedom for the bias test.
pub const MIN_SIDES: u32 = 2;

pub const MAX_SIDES: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceSet {
    pub name: String,
    #[serde(default)]
    pub dice: Vec<Die>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Die {
    pub name: String,
    pub sides: u32,
    /// Raw recorded values; range filtering happens when viewing.
    #[serde(default)]
    pub rolls: Vec<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum DiceSetError {
    #[error("reading dice set {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("writing dice set {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing dice set {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("serializing dice set: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("dice set name must not be empty")]
    EmptyName,
    #[error("duplicate die name in set: {0}")]
    DuplicateDie(String),
    #[error("die {name} has {sides} sides; at least {} required", MIN_SIDES)]
    TooFewSides { name: String, sides: u32 },
    #[error("die {name} has {sides} sides; at most {} supported", MAX_SIDES)]
    TooManySides { name: String, sides: u32 },
    #[error("no die named {0:?} in set")]
    UnknownDie(String),
}

impl Die {
    pub fn new(name: impl Into<String>, sides: u32) -> Self {
        Self {
            name: name.into(),
            sides,
            rolls: Vec::new(),
        }
    }

    pub fn record(&mut self, values: &[i64]) {
        self.rolls.extend_from_slice(values);
    }
}

impl DiceSet {
    /// A fresh set holding one die per entry of [`STANDARD_SIDES`].
    pub fn standard(name: impl Into<String>) -> Self {
        let mut d10_count = 0;
        let dice = STANDARD_SIDES
            .iter()
            .map(|&sides| {
                let name = if sides == 10 {
                    d10_count += 1;
                    format!("d10 ({d10_count})")
                } else {
                    format!("d{sides}")
                };
                Die::new(name, sides)
            })
            .collect();
        Self {
            name: name.into(),
            dice,
        }
    }

    pub fn load(path: &Path) -> Result<Self, DiceSetError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DiceSetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let set: DiceSet = toml::from_str(&raw).map_err(|source| DiceSetError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        set.validate()?;
        Ok(set)
    }

    pub fn save(&self, path: &Path) -> Result<(), DiceSetError> {
        self.validate()?;
        let raw = toml::to_string(self)?;
        std::fs::write(path, raw).map_err(|source| DiceSetError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), DiceSetError> {
        if self.name.trim().is_empty() {
            return Err(DiceSetError::EmptyName);
        }
        let mut seen = HashSet::new();
        for die in &self.dice {
            check_sides(&die.name, die.sides)?;
            if !seen.insert(die.name.as_str()) {
                return Err(DiceSetError::DuplicateDie(die.name.clone()));
            }
        }
        Ok(())
    }

    /// Add a custom die; names are unique within a set.
    pub fn add_die(&mut self, name: &str, sides: u32) -> Result<&mut Die, DiceSetError> {
        check_sides(name, sides)?;
        if self.dice.iter().any(|d| d.name == name) {
            return Err(DiceSetError::DuplicateDie(name.to_string()));
        }
        self.dice.push(Die::new(name, sides));
        let idx = self.dice.len() - 1;
        Ok(&mut self.dice[idx])
    }

    pub fn die(&self, name: &str) -> Result<&Die, DiceSetError> {
        self.dice
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| DiceSetError::UnknownDie(name.to_string()))
    }

    pub fn die_mut(&mut self, name: &str) -> Result<&mut Die, DiceSetError> {
        self.dice
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| DiceSetError::UnknownDie(name.to_string()))
    }

    /// Dice ordered by side count; ties keep file order.
    pub fn dice_by_sides(&self) -> Vec<&Die> {
        let mut dice: Vec<&Die> = self.dice.iter().collect();
        dice.sort_by_key(|d| d.sides);
        dice
    }
}

fn check_sides(name: &str, sides: u32) -> Result<(), DiceSetError> {
    if sides < MIN_SIDES {
        return Err(DiceSetError::TooFewSides {
            name: name.to_string(),
            sides,
        });
    }
    if sides > MAX_SIDES {
        return Err(DiceSetError::TooManySides {
            name: name.to_string(),
            sides,
        });
    }
    Ok(())
}
