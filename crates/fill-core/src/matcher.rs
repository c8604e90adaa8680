//! Field label to answer value matching

use crate::answers::AnswerSet;

/// One semantic category: trigger keywords looked for in the field label,
/// and target substrings looked for in the answer keys.
struct Category {
    triggers: &'static [&'static str],
    targets: &'static [&'static str],
}

/// Categories are evaluated in this order; the first one that both
/// triggers on the label and finds a target key wins.
const CATEGORIES: &[Category] = &[
    Category {
        triggers: &["name", "first", "last", "full"],
        targets: &["name"],
    },
    Category {
        triggers: &["email", "mail"],
        targets: &["email"],
    },
    Category {
        triggers: &["phone", "tel", "number"],
        targets: &["phone"],
    },
    Category {
        triggers: &["address", "street", "addr"],
        targets: &["address"],
    },
    Category {
        triggers: &["date", "birth", "dob"],
        targets: &["birth", "date", "dob"],
    },
];

/// Pick the best answer value for a model-identified field label.
///
/// Rules fire in order, case-insensitively:
/// 1. an answer key that contains the label, or is contained by it,
///    first match in insertion order;
/// 2. the semantic category chain above;
/// 3. the model-suggested value, returned verbatim (may be empty).
///
/// Pure function of its inputs; never fails.
pub fn match_field(field_name: &str, answers: &AnswerSet, suggested: &str) -> String {
    let field_lower = field_name.to_lowercase();

    for (key, value) in answers {
        let key_lower = key.to_lowercase();
        if field_lower.contains(&key_lower) || key_lower.contains(&field_lower) {
            return value.clone();
        }
    }

    for category in CATEGORIES {
        if !category.triggers.iter().any(|t| field_lower.contains(t)) {
            continue;
        }
        for (key, value) in answers {
            let key_lower = key.to_lowercase();
            if category.targets.iter().any(|t| key_lower.contains(t)) {
                return value.clone();
            }
        }
    }

    suggested.to_string()
}
