//! The static plan catalog. Plans are not stored; subscriptions reference them by id.
use serde::Serialize;
use utoipa::ToSchema;

pub const FREE: &str = "free";
pub const BASIC: &str = "basic";
pub const PREMIUM: &str = "premium";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Plan {
    #[schema(value_type = String, example = "premium")]
    pub id: &'static str,
    #[schema(value_type = String)]
    pub name: &'static str,
    #[schema(value_type = String, example = "Premium")]
    pub display_name: &'static str,
    /// Monthly price in cents of `currency`
    pub price_cents: i64,
    #[schema(value_type = String, example = "BRL")]
    pub currency: &'static str,
    pub max_students: u64,
    #[schema(value_type = Vec<String>)]
    pub features: &'static [&'static str],
    #[schema(value_type = String)]
    pub color: &'static str,
    pub popular: bool,
}

pub const PLANS: [Plan; 3] = [
    Plan {
        id: FREE,
        name: FREE,
        display_name: "Gratuito",
        price_cents: 0,
        currency: "BRL",
        max_students: 1,
        features: &["agenda", "treinos básicos"],
        color: "bronze-metal",
        popular: false,
    },
    Plan {
        id: BASIC,
        name: BASIC,
        display_name: "Básico",
        price_cents: 2990,
        currency: "BRL",
        max_students: 10,
        features: &["agenda", "treinos básicos"],
        color: "silver-metal",
        popular: false,
    },
    Plan {
        id: PREMIUM,
        name: PREMIUM,
        display_name: "Premium",
        price_cents: 5990,
        currency: "BRL",
        max_students: 30,
        features: &["agenda", "treinos personalizados", "evolução"],
        color: "gold-metal",
        popular: true,
    },
];

/// Looks up a plan by id. Stored plan types may carry stray whitespace, so the id is trimmed.
pub fn find_by_id(plan_id: &str) -> Option<Plan> {
    let plan_id = plan_id.trim();
    PLANS.iter().find(|plan| plan.id == plan_id).copied()
}

pub fn free_plan() -> Plan {
    PLANS[0]
}

impl Plan {
    pub fn can_add_student(&self, current_count: u64) -> bool {
        current_count < self.max_students
    }

    pub fn remaining_slots(&self, current_count: u64) -> u64 {
        self.max_students.saturating_sub(current_count)
    }
}
