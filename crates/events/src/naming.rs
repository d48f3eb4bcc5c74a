//! Category to table naming
//!
//! The sink and the provisioning tool must agree byte-for-byte on table
//! names, so the mapping lives here as a single pure function.

/// Map an event category to its physical warehouse table name.
///
/// `order.lifecycle` becomes `analytics_order_lifecycle_events`. The mapping
/// is pure and stable: the same category always yields the same name.
pub fn table_name(category: &str) -> String {
    format!("analytics_{}_events", category.replace('.', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_dots_to_underscores() {
        assert_eq!(
            table_name("order.lifecycle"),
            "analytics_order_lifecycle_events"
        );
        assert_eq!(
            table_name("driver.telemetry"),
            "analytics_driver_telemetry_events"
        );
    }

    #[test]
    fn stable_across_calls() {
        let first = table_name("campaign.interaction");
        for _ in 0..100 {
            assert_eq!(table_name("campaign.interaction"), first);
        }
    }
}
