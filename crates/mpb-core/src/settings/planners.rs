//! Name unification for planners, steer functions and robot models.
//!
//! The config template is the source of truth for which planners exist: its
//! `benchmark.planning` toggle map carries one key per planner compiled into
//! the binary. User-facing names are unified against those keys so that
//! "RRT*", "rrt_star" and "rrtstar" all land on the same toggle.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Steer functions in the binary's index order (`benchmark.steer_functions`
/// holds indices into this table).
pub const STEER_FUNCTIONS: &[&str] = &[
    "reeds_shepp",
    "dubins",
    "linear",
    "cc_dubins",
    "hc_reeds_shepp",
    "posq",
    "car",
];

/// Forward-propagation robot models in the binary's index order
/// (`benchmark.forward_propagations`).
pub const ROBOT_MODELS: &[&str] = &["kinematic_car", "kinematic_single_track"];

static DISPLAY_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("rrt", "RRT"),
        ("rrt_star", "RRT*"),
        ("informed_rrt_star", "Informed RRT*"),
        ("sorrt_star", "SORRT*"),
        ("bit_star", "BIT*"),
        ("fmt", "FMT"),
        ("bfmt", "BFMT"),
        ("prm", "PRM"),
        ("prm_star", "PRM*"),
        ("est", "EST"),
        ("sbl", "SBL"),
        ("kpiece", "KPIECE"),
        ("stride", "STRIDE"),
        ("spars", "SPARS"),
        ("spars2", "SPARS2"),
        ("pdst", "PDST"),
        ("sst", "SST"),
        ("cforest", "CForest"),
        ("theta_star", "Theta*"),
        ("sbpl_arastar", "SBPL ARA*"),
        ("sbpl_adstar", "SBPL AD*"),
        ("sbpl_anastar", "SBPL ANA*"),
        ("sbpl_lazy_ara", "SBPL Lazy ARA*"),
        ("sbpl_mha", "SBPL MHA*"),
    ])
});

/// Curated family aliases: a single user name expanding to several toggles.
/// Expansion is intersected with the template's keys, so an alias never turns
/// on a planner the binary does not know.
static GROUP_ALIASES: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        (
            "anytime",
            &[
                "rrt_star",
                "informed_rrt_star",
                "sorrt_star",
                "bit_star",
                "cforest",
                "prm_star",
            ][..],
        ),
        (
            "sbpl",
            &[
                "sbpl_arastar",
                "sbpl_adstar",
                "sbpl_anastar",
                "sbpl_lazy_ara",
                "sbpl_mha",
            ][..],
        ),
    ])
});

/// Human-readable planner name for logs and plot captions.
pub fn display_name(key: &str) -> &str {
    DISPLAY_NAMES.get(key).copied().unwrap_or(key)
}

/// Fold a user-supplied name onto the toggle-key alphabet: lowercase, `*`
/// spelled out, punctuation dropped.
fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '*' => out.push_str("star"),
            c if c.is_ascii_alphanumeric() => out.push(c.to_ascii_lowercase()),
            _ => {}
        }
    }
    out
}

/// Unify `aliases` against the template's planner keys.
///
/// Returns the matched keys in template order plus the aliases that matched
/// nothing. Duplicate aliases collapse onto one selection.
pub fn unify_planners<S: AsRef<str>>(
    template_keys: &[String],
    aliases: &[S],
) -> (Vec<String>, Vec<String>) {
    let normalized: HashMap<String, &String> = template_keys
        .iter()
        .map(|k| (normalize(k), k))
        .collect();

    let mut wanted: Vec<&String> = Vec::new();
    let mut unmatched = Vec::new();
    for alias in aliases {
        let alias = alias.as_ref();
        if let Some(group) = GROUP_ALIASES.get(normalize(alias).as_str()) {
            let mut hit = false;
            for member in *group {
                if let Some(key) = normalized.get(*member) {
                    wanted.push(key);
                    hit = true;
                }
            }
            if !hit {
                unmatched.push(alias.to_string());
            }
            continue;
        }
        match normalized.get(normalize(alias).as_str()) {
            Some(key) => wanted.push(key),
            None => unmatched.push(alias.to_string()),
        }
    }

    let selected = template_keys
        .iter()
        .filter(|k| wanted.iter().any(|w| w == k))
        .cloned()
        .collect();
    (selected, unmatched)
}

/// Unify a steer-function name to its config index.
pub fn unify_steer_function(alias: &str) -> Option<usize> {
    let n = normalize(alias);
    STEER_FUNCTIONS.iter().position(|s| normalize(s) == n)
}

/// Unify a robot-model name to its config index.
pub fn unify_robot_model(alias: &str) -> Option<usize> {
    let n = normalize(alias);
    ROBOT_MODELS.iter().position(|s| normalize(s) == n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn aliases_unify_across_spellings() {
        let template = keys(&["rrt", "rrt_star", "informed_rrt_star", "bit_star"]);
        for alias in ["rrt_star", "RRT*", "RRTstar", "rrt-star"] {
            let (selected, unmatched) = unify_planners(&template, &[alias]);
            assert_eq!(selected, keys(&["rrt_star"]), "alias {alias}");
            assert!(unmatched.is_empty());
        }
    }

    #[test]
    fn selection_preserves_template_order() {
        let template = keys(&["rrt", "rrt_star", "informed_rrt_star"]);
        let (selected, _) = unify_planners(&template, &["informed_rrt_star", "rrt"]);
        assert_eq!(selected, keys(&["rrt", "informed_rrt_star"]));
    }

    #[test]
    fn unknown_aliases_are_reported() {
        let template = keys(&["rrt"]);
        let (selected, unmatched) = unify_planners(&template, &["rrt", "warp_drive"]);
        assert_eq!(selected, keys(&["rrt"]));
        assert_eq!(unmatched, vec!["warp_drive".to_string()]);
    }

    #[test]
    fn group_alias_expands_to_present_members_only() {
        let template = keys(&["rrt", "rrt_star", "bit_star"]);
        let (selected, unmatched) = unify_planners(&template, &["anytime"]);
        assert_eq!(selected, keys(&["rrt_star", "bit_star"]));
        assert!(unmatched.is_empty());
    }

    #[test]
    fn steer_functions_unify_to_indices() {
        assert_eq!(unify_steer_function("reeds_shepp"), Some(0));
        assert_eq!(unify_steer_function("Reeds-Shepp"), Some(0));
        assert_eq!(unify_steer_function("car"), Some(6));
        assert_eq!(unify_steer_function("teleport"), None);
    }

    #[test]
    fn display_names_fall_back_to_key() {
        assert_eq!(display_name("informed_rrt_star"), "Informed RRT*");
        assert_eq!(display_name("cliff-dijkstra"), "cliff-dijkstra");
    }
}
