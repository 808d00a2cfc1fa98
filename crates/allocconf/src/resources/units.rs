use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),
    #[error("Converting {value} from '{from}' to '{to}' does not fit into 8 bytes")]
    Overflow {
        value: u64,
        from: String,
        to: String,
    },
}

/// Converts amounts between unit symbols.
pub trait UnitConverter: Send + Sync {
    fn is_known(&self, unit: &str) -> bool;

    /// Converts `value` expressed in `from` into `to`. Results are truncated towards zero.
    fn convert(&self, value: u64, from: &str, to: &str) -> Result<u64, UnitError>;
}

/// Decimal (`p` .. `P`) and binary (`Ki` .. `Pi`) unit prefixes.
/// The empty symbol stands for the base unit.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardUnits;

/// (symbol, numerator, denominator) relative to the base unit
const UNITS: &[(&str, u128, u128)] = &[
    ("p", 1, 1_000_000_000_000),
    ("n", 1, 1_000_000_000),
    ("u", 1, 1_000_000),
    ("m", 1, 1_000),
    ("", 1, 1),
    ("k", 1_000, 1),
    ("M", 1_000_000, 1),
    ("G", 1_000_000_000, 1),
    ("T", 1_000_000_000_000, 1),
    ("P", 1_000_000_000_000_000, 1),
    ("Ki", 1 << 10, 1),
    ("Mi", 1 << 20, 1),
    ("Gi", 1 << 30, 1),
    ("Ti", 1 << 40, 1),
    ("Pi", 1 << 50, 1),
];

fn unit_factor(unit: &str) -> Result<(u128, u128), UnitError> {
    UNITS
        .iter()
        .find(|(symbol, _, _)| *symbol == unit)
        .map(|(_, numerator, denominator)| (*numerator, *denominator))
        .ok_or_else(|| UnitError::UnknownUnit(unit.to_string()))
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl UnitConverter for StandardUnits {
    fn is_known(&self, unit: &str) -> bool {
        unit_factor(unit).is_ok()
    }

    fn convert(&self, value: u64, from: &str, to: &str) -> Result<u64, UnitError> {
        let (from_num, from_den) = unit_factor(from)?;
        let (to_num, to_den) = unit_factor(to)?;
        if from == to {
            return Ok(value);
        }

        let mut numerator = from_num * to_den;
        let mut denominator = from_den * to_num;
        let divisor = gcd(numerator, denominator);
        numerator /= divisor;
        denominator /= divisor;

        let overflow = || UnitError::Overflow {
            value,
            from: from.to_string(),
            to: to.to_string(),
        };
        let scaled = (value as u128).checked_mul(numerator).ok_or_else(overflow)?;
        u64::try_from(scaled / denominator).map_err(|_| overflow())
    }
}
