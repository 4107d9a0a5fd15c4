//! makro_engine - Cell recalculation engine + Rhai integration.

pub(crate) mod builtins;
pub mod engine;
pub mod error;

pub use error::{EngineError, Result};

#[cfg(test)]
mod tests {
    use crate::engine::*;

    #[test]
    fn test_from_str_single_letter_columns() {
        let a1 = CellRef::from_str("A1").unwrap();
        assert_eq!(a1.col, 0);
        assert_eq!(a1.row, 0);

        let b1 = CellRef::from_str("B1").unwrap();
        assert_eq!(b1.col, 1);
        assert_eq!(b1.row, 0);

        let z1 = CellRef::from_str("Z1").unwrap();
        assert_eq!(z1.col, 25);
        assert_eq!(z1.row, 0);
    }

    #[test]
    fn test_from_str_multi_letter_columns() {
        assert_eq!(CellRef::from_str("AA1").unwrap().col, 26);
        assert_eq!(CellRef::from_str("AB1").unwrap().col, 27);
        assert_eq!(CellRef::from_str("AZ1").unwrap().col, 51);
        assert_eq!(CellRef::from_str("BA1").unwrap().col, 52);
        assert_eq!(CellRef::from_str("ZZ1").unwrap().col, 701);
        assert_eq!(CellRef::from_str("AAA1").unwrap().col, 702);
    }

    #[test]
    fn test_from_str_row_numbers() {
        assert_eq!(CellRef::from_str("A1").unwrap().row, 0);
        assert_eq!(CellRef::from_str("A10").unwrap().row, 9);
        assert_eq!(CellRef::from_str("A100").unwrap().row, 99);
    }

    #[test]
    fn test_from_str_invalid_inputs() {
        assert!(CellRef::from_str("").is_none());
        assert!(CellRef::from_str("123").is_none());
        assert!(CellRef::from_str("ABC").is_none());
        assert!(CellRef::from_str("A0").is_none());
        assert!(CellRef::from_str("1A").is_none());
        assert!(CellRef::from_str("A 1").is_none());
        assert!(CellRef::from_str("A1B").is_none());
    }

    #[test]
    fn test_to_string() {
        assert_eq!(CellRef::new(0, 0).to_string(), "A1");
        assert_eq!(CellRef::new(25, 9).to_string(), "Z10");
        assert_eq!(CellRef::new(26, 11).to_string(), "AA12");
        assert_eq!(CellRef::new(701, 0).to_string(), "ZZ1");
        assert_eq!(CellRef::new(702, 0).to_string(), "AAA1");
    }

    #[test]
    fn test_decode_reports_invalid_address() {
        let err = CellRef::decode("a1").unwrap_err();
        assert_eq!(err.to_string(), "Invalid cell reference: a1");
    }
}
