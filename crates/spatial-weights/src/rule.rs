use std::{fmt, str::FromStr};

use crate::error::WeightsError;

/// Rule deciding which pairs of units are neighbors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Units sharing any boundary point.
    Queen,
    /// Units sharing a boundary segment of positive length.
    Rook,
    /// The `k` nearest centroids (not necessarily symmetric).
    Knn { k: usize },
    /// Centroids within Euclidean distance `radius`.
    Distance { radius: f64 },
}

impl Rule {
    /// Returns `true` if the rule always produces a symmetric graph.
    pub fn is_symmetric(&self) -> bool {
        !matches!(self, Rule::Knn { .. })
    }
}

impl FromStr for Rule {
    type Err = WeightsError;

    /// Parses `queen`, `rook`, `knn:<k>` and `distance:<radius>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WeightsError::InvalidRule(s.to_string());
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (s.trim(), None),
        };

        match (name.to_ascii_lowercase().as_str(), arg) {
            ("queen", None) => Ok(Rule::Queen),
            ("rook", None) => Ok(Rule::Rook),
            ("knn", Some(k)) => {
                let k = k.parse::<usize>().map_err(|_| invalid())?;
                if k == 0 { return Err(invalid()) }
                Ok(Rule::Knn { k })
            }
            ("distance", Some(r)) => {
                let radius = r.parse::<f64>().map_err(|_| invalid())?;
                if !radius.is_finite() || radius < 0.0 { return Err(invalid()) }
                Ok(Rule::Distance { radius })
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Queen => write!(f, "queen"),
            Rule::Rook => write!(f, "rook"),
            Rule::Knn { k } => write!(f, "knn:{k}"),
            Rule::Distance { radius } => write!(f, "distance:{radius}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_rules() {
        assert_eq!("queen".parse::<Rule>().unwrap(), Rule::Queen);
        assert_eq!("Rook".parse::<Rule>().unwrap(), Rule::Rook);
        assert_eq!("knn:4".parse::<Rule>().unwrap(), Rule::Knn { k: 4 });
        assert_eq!("distance: 2.5".parse::<Rule>().unwrap(), Rule::Distance { radius: 2.5 });
    }

    #[test]
    fn rejects_malformed_rules() {
        for bad in ["", "bishop", "knn", "knn:0", "knn:x", "distance:-1", "queen:2"] {
            assert!(bad.parse::<Rule>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn display_roundtrips() {
        for rule in [Rule::Queen, Rule::Rook, Rule::Knn { k: 3 }, Rule::Distance { radius: 1.5 }] {
            assert_eq!(rule.to_string().parse::<Rule>().unwrap(), rule);
        }
    }

    #[test]
    fn only_knn_is_asymmetric() {
        assert!(Rule::Queen.is_symmetric());
        assert!(Rule::Distance { radius: 1.0 }.is_symmetric());
        assert!(!Rule::Knn { k: 1 }.is_symmetric());
    }
}
