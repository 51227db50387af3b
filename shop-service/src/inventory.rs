//! Variant stock matching, decrement and restore
//!
//! Pure functions over [`VariantStock`] documents. A product may own
//! several variant documents; a decrement searches all of them until
//! one satisfies the requested quantity, and the enclosing transaction
//! aborts when none does. Restore is the exact inverse on the same
//! matched slot.
//!
//! Color and size matching is case-insensitive on trimmed strings.
use crate::error::AppError;
use crate::models::variant::{ScenarioType, VariantStock};

/// A single stock adjustment request, derived from an order line or a
/// POS sale variant.
#[derive(Debug, Clone)]
pub struct StockRequest {
    pub scenario: ScenarioType,
    pub color: Option<String>,
    pub size: Option<String>,
    pub qty: i32,
}

impl StockRequest {
    pub fn new(
        scenario: ScenarioType,
        color: Option<String>,
        size: Option<String>,
        qty: i32,
    ) -> Self {
        Self {
            scenario,
            color,
            size,
            qty,
        }
    }

    /// Infer the scenario from which optional attributes an order
    /// line carries: color+size, color only, or neither.
    pub fn from_line(color: Option<String>, size: Option<String>, qty: i32) -> Self {
        let scenario = match (&color, &size) {
            (Some(_), Some(_)) => ScenarioType::SizedColor,
            (Some(_), None) => ScenarioType::ColorOnly,
            _ => ScenarioType::Flat,
        };
        Self {
            scenario,
            color,
            size,
            qty,
        }
    }

    /// How the offending line is named in an insufficient-stock error
    pub fn label(&self) -> String {
        match self.scenario {
            ScenarioType::SizedColor => format!(
                "{}/{}",
                self.color.as_deref().unwrap_or("?"),
                self.size.as_deref().unwrap_or("?")
            ),
            ScenarioType::ColorOnly => self.color.as_deref().unwrap_or("?").to_string(),
            ScenarioType::Flat => "standard product".to_string(),
        }
    }
}

fn matches_ci(a: &str, b: Option<&str>) -> bool {
    match b {
        Some(b) => a.trim().eq_ignore_ascii_case(b.trim()),
        None => false,
    }
}

/// Try to decrement `req.qty` from one document. Returns whether the
/// document satisfied the request; a document of a different scenario
/// or with too little stock is left untouched.
fn try_decrement(doc: &mut VariantStock, req: &StockRequest) -> bool {
    match (doc, req.scenario) {
        (VariantStock::SizedColor(groups), ScenarioType::SizedColor) => {
            for group in groups.iter_mut() {
                if !matches_ci(&group.color, req.color.as_deref()) {
                    continue;
                }
                for entry in group.sizes.iter_mut() {
                    if matches_ci(&entry.size, req.size.as_deref()) && entry.qty >= req.qty {
                        entry.qty -= req.qty;
                        return true;
                    }
                }
            }
            false
        }
        (VariantStock::ColorOnly(entries), ScenarioType::ColorOnly) => {
            for entry in entries.iter_mut() {
                if matches_ci(&entry.color, req.color.as_deref()) && entry.qty >= req.qty {
                    entry.qty -= req.qty;
                    return true;
                }
            }
            false
        }
        (VariantStock::Flat(entries), ScenarioType::Flat) => match entries.first_mut() {
            Some(entry) if entry.qty >= req.qty => {
                entry.qty -= req.qty;
                true
            }
            _ => false,
        },
        _ => false,
    }
}

/// Try to put `req.qty` back into the slot a decrement took it from.
fn try_restore(doc: &mut VariantStock, req: &StockRequest) -> bool {
    match (doc, req.scenario) {
        (VariantStock::SizedColor(groups), ScenarioType::SizedColor) => {
            for group in groups.iter_mut() {
                if !matches_ci(&group.color, req.color.as_deref()) {
                    continue;
                }
                for entry in group.sizes.iter_mut() {
                    if matches_ci(&entry.size, req.size.as_deref()) {
                        entry.qty += req.qty;
                        return true;
                    }
                }
            }
            false
        }
        (VariantStock::ColorOnly(entries), ScenarioType::ColorOnly) => {
            for entry in entries.iter_mut() {
                if matches_ci(&entry.color, req.color.as_deref()) {
                    entry.qty += req.qty;
                    return true;
                }
            }
            false
        }
        (VariantStock::Flat(entries), ScenarioType::Flat) => match entries.first_mut() {
            Some(entry) => {
                entry.qty += req.qty;
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// Decrement across all of a product's variant documents. Returns the
/// index of the document that satisfied the request, or the
/// insufficient-stock error naming the line.
pub fn decrement_across(
    docs: &mut [VariantStock],
    req: &StockRequest,
) -> Result<usize, AppError> {
    for (idx, doc) in docs.iter_mut().enumerate() {
        if try_decrement(doc, req) {
            return Ok(idx);
        }
    }
    Err(AppError::InsufficientStock(req.label()))
}

/// Restore across all of a product's variant documents. Returns the
/// index of the document whose slot was incremented; `None` when the
/// slot no longer exists (the restore is then skipped, not an error).
pub fn restore_across(docs: &mut [VariantStock], req: &StockRequest) -> Option<usize> {
    docs.iter_mut().position(|doc| try_restore(doc, req))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::variant::{ColorQty, ColorSizes, FlatQty, SizeQty};

    fn sized(color: &str, size: &str, qty: i32) -> VariantStock {
        VariantStock::SizedColor(vec![ColorSizes {
            color: color.into(),
            sizes: vec![SizeQty {
                size: size.into(),
                qty,
            }],
        }])
    }

    fn colored(color: &str, qty: i32) -> VariantStock {
        VariantStock::ColorOnly(vec![ColorQty {
            color: color.into(),
            qty,
        }])
    }

    fn flat(qty: i32) -> VariantStock {
        VariantStock::Flat(vec![FlatQty { qty }])
    }

    fn req(scenario: ScenarioType, color: Option<&str>, size: Option<&str>, qty: i32) -> StockRequest {
        StockRequest::new(
            scenario,
            color.map(String::from),
            size.map(String::from),
            qty,
        )
    }

    #[test]
    fn sized_color_decrement_matches_case_insensitive_trimmed() {
        let mut docs = vec![sized("Red", "M", 5)];
        let r = req(ScenarioType::SizedColor, Some("  red "), Some("m"), 3);
        assert_eq!(decrement_across(&mut docs, &r).unwrap(), 0);
        assert_eq!(docs[0], sized("Red", "M", 2));
    }

    #[test]
    fn decrement_to_zero_then_refuse() {
        let mut docs = vec![colored("Blue", 5)];
        let r = req(ScenarioType::ColorOnly, Some("Blue"), None, 5);

        assert!(decrement_across(&mut docs, &r).is_ok());
        assert_eq!(docs[0], colored("Blue", 0));

        // Second identical request fails and stock never goes negative
        let err = decrement_across(&mut docs, &r).unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(ref l) if l == "Blue"));
        assert_eq!(docs[0], colored("Blue", 0));
    }

    #[test]
    fn flat_decrement_and_label() {
        let mut docs = vec![flat(2)];
        let r = req(ScenarioType::Flat, None, None, 3);
        let err = decrement_across(&mut docs, &r).unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(ref l) if l == "standard product"));

        let r = req(ScenarioType::Flat, None, None, 2);
        assert!(decrement_across(&mut docs, &r).is_ok());
        assert_eq!(docs[0], flat(0));
    }

    #[test]
    fn search_spans_all_documents() {
        // First doc matches the color but is short on stock; the
        // second satisfies the request.
        let mut docs = vec![colored("Green", 1), colored("Green", 10)];
        let r = req(ScenarioType::ColorOnly, Some("green"), None, 4);
        assert_eq!(decrement_across(&mut docs, &r).unwrap(), 1);
        assert_eq!(docs[0], colored("Green", 1));
        assert_eq!(docs[1], colored("Green", 6));
    }

    #[test]
    fn scenario_mismatch_is_skipped() {
        let mut docs = vec![flat(100), colored("Red", 100)];
        let r = req(ScenarioType::SizedColor, Some("Red"), Some("M"), 1);
        assert!(decrement_across(&mut docs, &r).is_err());
    }

    #[test]
    fn restore_is_exact_inverse() {
        let original = sized("Red", "M", 7);
        let mut docs = vec![original.clone()];
        let r = req(ScenarioType::SizedColor, Some("Red"), Some("M"), 3);

        decrement_across(&mut docs, &r).unwrap();
        assert_eq!(docs[0], sized("Red", "M", 4));

        assert_eq!(restore_across(&mut docs, &r), Some(0));
        assert_eq!(docs[0], original);
    }

    #[test]
    fn restore_missing_slot_is_skipped() {
        let mut docs = vec![colored("Red", 5)];
        let r = req(ScenarioType::ColorOnly, Some("Purple"), None, 2);
        assert_eq!(restore_across(&mut docs, &r), None);
        assert_eq!(docs[0], colored("Red", 5));
    }

    #[test]
    fn from_line_infers_scenario() {
        assert_eq!(
            StockRequest::from_line(Some("Red".into()), Some("M".into()), 1).scenario,
            ScenarioType::SizedColor
        );
        assert_eq!(
            StockRequest::from_line(Some("Red".into()), None, 1).scenario,
            ScenarioType::ColorOnly
        );
        assert_eq!(
            StockRequest::from_line(None, None, 1).scenario,
            ScenarioType::Flat
        );
    }
}
