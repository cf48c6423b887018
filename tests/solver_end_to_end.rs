//! End-to-end scenarios through the public entry point.

use anvil_order::{
    find_best_order, prior_work_penalty, BookInput, EnchantMap, Objective, SearchConfig,
    SearchError, SearchResult, TargetInput, INFEASIBLE_LEVELS, MAX_MERGE_LEVELS,
};

fn book(id: &str, pairs: &[(&str, u32)]) -> BookInput {
    BookInput {
        id: id.to_string(),
        enchantments: EnchantMap::from_pairs(pairs.iter().map(|&(e, l)| (e, l))),
        initial_work: 0,
    }
}

fn assert_steps_well_formed(result: &SearchResult) {
    for step in &result.steps {
        assert!(step.cost_levels <= MAX_MERGE_LEVELS, "step over the cap");
        assert_eq!(step.resulting_penalty, prior_work_penalty(step.resulting_work));
    }
    assert_eq!(
        result.total_levels,
        result.steps.iter().map(|s| s.cost_levels).sum::<u32>()
    );
    assert_eq!(
        result.total_xp,
        result.steps.iter().map(|s| s.cost_xp).sum::<u32>()
    );
}

#[test]
fn fresh_target_with_two_equal_books_is_one_merge() {
    let target = TargetInput {
        name: "Sword".to_string(),
        enchantments: EnchantMap::new(),
        initial_work: 0,
    };
    let books = vec![
        book("Book A", &[("sharpness", 3)]),
        book("Book B", &[("sharpness", 3)]),
    ];
    let result = find_best_order(Some(&target), &books, &SearchConfig::exhaustive());

    assert!(result.is_feasible());
    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.combined_enchants.level("sharpness"), 4);
    assert_eq!(result.total_levels, 4);
    assert_steps_well_formed(&result);
}

#[test]
fn enchanted_target_joins_the_search() {
    let target = TargetInput {
        name: "Pickaxe".to_string(),
        enchantments: EnchantMap::from_pairs([("efficiency", 3)]),
        initial_work: 0,
    };
    let books = vec![
        book("Book A", &[("unbreaking", 3)]),
        book("Book B", &[("fortune", 2)]),
    ];
    let result = find_best_order(Some(&target), &books, &SearchConfig::exhaustive());

    assert!(result.is_feasible());
    assert_eq!(result.steps.len(), 2);
    assert_eq!(result.combined_enchants.level("efficiency"), 3);
    assert_eq!(result.combined_enchants.level("unbreaking"), 3);
    assert_eq!(result.combined_enchants.level("fortune"), 2);
    assert_steps_well_formed(&result);
}

#[test]
fn target_is_never_sacrificed() {
    let target = TargetInput {
        name: "My Sword".to_string(),
        enchantments: EnchantMap::from_pairs([("protection", 2)]),
        initial_work: 1,
    };
    let books = vec![
        book("Book A", &[("sharpness", 3)]),
        book("Book B", &[("sharpness", 3)]),
        book("Book C", &[("unbreaking", 3)]),
    ];
    let result = find_best_order(Some(&target), &books, &SearchConfig::exhaustive());

    assert!(result.is_feasible());
    for step in &result.steps {
        assert_ne!(step.sacrifice_label, "My Sword");
    }
    // The survivor of the last merge is the target itself.
    assert_eq!(result.steps.last().unwrap().target_label, "My Sword");
    assert_eq!(result.combined_enchants.level("protection"), 2);
    assert_steps_well_formed(&result);
}

#[test]
fn ten_identical_books_beat_the_sequential_baseline() {
    let books: Vec<_> = (0..10)
        .map(|i| book(&format!("Book {i}"), &[("sharpness", 1)]))
        .collect();

    // Naive baseline: always merge the next book into the running item.
    // Work grows by one every step, so the penalties blow past the cap.
    let mut baseline_levels = 0u64;
    let mut baseline_feasible = true;
    let mut running = EnchantMap::from_pairs([("sharpness", 1)]);
    let mut work = 0u32;
    for next in &books[1..] {
        let cost = anvil_order::merge_level_cost(&running, work, &next.enchantments, 0).round();
        if cost > f64::from(MAX_MERGE_LEVELS) {
            baseline_feasible = false;
            break;
        }
        baseline_levels += cost as u64;
        running = running.merged_with(&next.enchantments);
        work += 1;
    }

    let result = find_best_order(None, &books, &SearchConfig::exhaustive());
    assert!(result.is_feasible());
    assert_steps_well_formed(&result);
    assert!(
        !baseline_feasible || u64::from(result.total_levels) <= baseline_levels,
        "exhaustive result must not lose to sequential merging"
    );
    // The balanced tree keeps every item shallow enough to stay legal.
    assert_eq!(result.total_levels, 41);
    assert_eq!(result.total_xp, 555);
    assert_eq!(result.final_work, 4);
}

#[test]
fn fifteen_books_solve_with_a_wide_beam() {
    let target = TargetInput {
        name: "Sword".to_string(),
        enchantments: EnchantMap::new(),
        initial_work: 0,
    };
    let books: Vec<_> = (0..15)
        .map(|i| book(&format!("Book {i}"), &[("sharpness", 1)]))
        .collect();
    let config = SearchConfig::default().with_beam_width(Some(2000));
    let result = find_best_order(Some(&target), &books, &config);

    assert!(result.is_feasible());
    assert_eq!(result.steps.len(), 14);
    assert_steps_well_formed(&result);
    assert!(result.combined_enchants.level("sharpness") >= 2);
}

#[test]
fn impossible_merge_is_reported_not_thrown() {
    let mut a = book("Worn A", &[("sharpness", 1)]);
    a.initial_work = 6;
    let mut b = book("Worn B", &[("sharpness", 1)]);
    b.initial_work = 6;

    for config in [
        SearchConfig::exhaustive(),
        SearchConfig::default(),
        SearchConfig::fast(),
    ] {
        let result = find_best_order(None, &[a.clone(), b.clone()], &config);
        assert!(!result.is_feasible());
        assert_eq!(result.total_levels, INFEASIBLE_LEVELS);
        assert!(matches!(result.error, Some(SearchError::NoSolution { .. })));
        assert!(result.steps.is_empty());
    }
}

#[test]
fn empty_input_yields_trivial_result() {
    let result = find_best_order(None, &[], &SearchConfig::default());
    assert!(result.is_feasible());
    assert_eq!(result.total_levels, 0);
    assert_eq!(result.states_explored, 0);
}

#[test]
fn xp_objective_produces_consistent_totals() {
    let books = vec![
        book("Book A", &[("sharpness", 3)]),
        book("Book B", &[("looting", 2)]),
        book("Book C", &[("unbreaking", 3)]),
    ];
    let config = SearchConfig::exhaustive().with_objective(Objective::Xp);
    let result = find_best_order(None, &books, &config);
    assert!(result.is_feasible());
    assert_steps_well_formed(&result);
}
