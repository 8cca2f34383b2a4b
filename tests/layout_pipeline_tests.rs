use gitscape::layout::{
    Focus, Layout, LayoutOptions, PlacementOptions, RankRange, ViewMode, ViewPlanner,
    canonical_layer,
};
use gitscape::{BranchHistory, CiStatus, Commit, CommitType, Domain};

/// Helper function to create a test commit
fn commit(hash: &str, at: i64, parents: &[&str], domain: Option<Domain>) -> Commit {
    Commit {
        hash: hash.to_string(),
        message: format!("commit {hash}"),
        authored_at: at,
        line_delta: 60,
        parents: parents.iter().map(|p| p.to_string()).collect(),
        domain,
        commit_type: None,
        status: CiStatus::Success,
    }
}

fn options(jitter: bool) -> LayoutOptions {
    LayoutOptions {
        placement: PlacementOptions {
            jitter,
            ..Default::default()
        },
        focus: Focus::All,
    }
}

/// main: m0..m4, feature-x forks from m1, docs-fix forks from a missing commit
fn create_test_histories() -> Vec<BranchHistory> {
    let main = vec![
        commit("m0", 100, &[], None),
        commit("m1", 200, &["m0"], None),
        commit("m2", 500, &["m1"], None),
        commit("m3", 600, &["m2"], None),
        commit("m4", 900, &["m3"], None),
    ];
    let mut feature = main[..2].to_vec();
    feature.push(commit("fx1", 300, &["m1"], Some(Domain::Backend)));
    feature.push(commit("fx2", 400, &["fx1"], Some(Domain::Backend)));
    let ui = vec![
        commit("ui1", 700, &["pruned"], Some(Domain::Frontend)),
        commit("ui2", 800, &["ui1"], Some(Domain::Frontend)),
    ];
    vec![
        BranchHistory::new("feature-x", feature),
        BranchHistory::new("main", main),
        BranchHistory::new("ui", ui),
        BranchHistory::empty("fetch-failed"),
    ]
}

#[test]
fn test_sequence_is_sorted_and_ranked() {
    let layout = Layout::compute(&create_test_histories(), &options(true)).unwrap();
    let entries = layout.sequence().entries();
    assert_eq!(entries.len(), 9);
    for window in entries.windows(2) {
        assert!(window[0].commit.authored_at <= window[1].commit.authored_at);
    }
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.rank, i);
        assert_eq!(layout.position(entry.hash()).unwrap().rank, i);
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let histories = create_test_histories();
    let a = Layout::compute(&histories, &options(true)).unwrap();
    let b = Layout::compute(&histories, &options(true)).unwrap();

    for (hash, pa) in a.positions() {
        let pb = b.position(hash).unwrap();
        assert_eq!(pa.x.to_bits(), pb.x.to_bits());
        assert_eq!(pa.y.to_bits(), pb.y.to_bits());
        assert_eq!(pa.z.to_bits(), pb.z.to_bits());
        assert_eq!(pa.size.to_bits(), pb.size.to_bits());
    }
    assert_eq!(a.curves(), b.curves());
    assert_eq!(
        serde_json::to_string(&a.snapshot()).unwrap(),
        serde_json::to_string(&b.snapshot()).unwrap()
    );
}

#[test]
fn test_default_branch_curve_is_two_point_spine() {
    let layout = Layout::compute(&create_test_histories(), &options(true)).unwrap();
    let spine = layout.curve("main").unwrap();
    assert_eq!(spine.len(), 2);
    assert_eq!(spine[0], layout.position("m0").unwrap().position());
    assert_eq!(spine[1], layout.position("m4").unwrap().position());
}

#[test]
fn test_forked_branch_starts_at_parent_and_ends_in_its_lane() {
    let layout = Layout::compute(&create_test_histories(), &options(false)).unwrap();
    let curve = layout.curve("feature-x").unwrap();
    let parent = layout.position("m1").unwrap();
    assert_eq!(parent.rank, 1);
    assert_eq!(curve[0], parent.position());

    let end = curve.last().unwrap();
    assert_eq!(*end, layout.position("fx2").unwrap().position());
    let lane = layout.lanes()["feature-x"].lane;
    assert_eq!(lane, canonical_layer(Domain::Backend));
    // unclassified type offset is a unit vector at most
    assert!((end.y - lane).abs() <= 1.0 + 1e-9);
}

#[test]
fn test_truncated_history_uses_degraded_anchor() {
    let layout = Layout::compute(&create_test_histories(), &options(false)).unwrap();
    let curve = layout.curve("ui").unwrap();
    let first = layout.position("ui1").unwrap();
    let spacing = PlacementOptions::default().grid_spacing;
    assert_eq!(curve[0].x, (first.rank - 1) as f64 * spacing);
    assert_eq!(curve[0].y, 0.0);
    assert_eq!(curve[0].z, layout.lanes()["ui"].depth);
}

#[test]
fn test_lanes_unique_per_domain_and_spine_at_zero() {
    let layout = Layout::compute(&create_test_histories(), &options(true)).unwrap();
    let lanes = layout.lanes();
    assert_eq!(lanes["main"].lane, 0.0);
    for a in layout.branches() {
        for b in layout.branches() {
            if a.is_default || b.is_default || a.dominant_domain == b.dominant_domain {
                continue;
            }
            assert_ne!(lanes[&a.name].lane, lanes[&b.name].lane);
        }
    }
    assert!(layout.curve("fetch-failed").unwrap().is_empty());
}

#[test]
fn test_single_main_branch_positions() {
    let histories = vec![BranchHistory::new(
        "main",
        vec![
            commit("a", 1, &[], None),
            commit("b", 2, &["a"], None),
            commit("c", 3, &["b"], None),
        ],
    )];
    let spacing = PlacementOptions::default().grid_spacing;

    let flat = Layout::compute(&histories, &options(false)).unwrap();
    for (hash, rank) in [("a", 0), ("b", 1), ("c", 2)] {
        let p = flat.position(hash).unwrap();
        assert_eq!(p.x, rank as f64 * spacing);
        assert_eq!((p.y, p.z), (0.0, 0.0));
    }
    assert!(flat.position("c").unwrap().is_latest);

    let jittered = Layout::compute(&histories, &options(true)).unwrap();
    for p in jittered.positions().values() {
        assert!(p.y.abs() < 0.1 && p.z.abs() < 0.1);
    }
}

#[test]
fn test_only_globally_latest_commit_is_flagged() {
    let layout = Layout::compute(&create_test_histories(), &options(true)).unwrap();
    let latest: Vec<&str> = layout
        .positions()
        .values()
        .filter(|p| p.is_latest)
        .map(|p| p.hash.as_str())
        .collect();
    assert_eq!(latest, vec!["m4"]);
}

#[test]
fn test_focus_view_frames_branch_span() {
    let mut main = Vec::new();
    for i in 0..5 {
        let parents: Vec<String> = if i == 0 { vec![] } else { vec![format!("m{}", i - 1)] };
        let parents: Vec<&str> = parents.iter().map(String::as_str).collect();
        main.push(commit(&format!("m{i}"), i, &parents, None));
    }
    let mut topic = Vec::new();
    for i in 5..10 {
        let parent = if i == 5 { "m4".to_string() } else { format!("t{}", i - 1) };
        topic.push(commit(&format!("t{i}"), i, &[parent.as_str()], Some(Domain::Db)));
    }
    main.push(commit("m10", 10, &["m4"], None));
    let histories = vec![BranchHistory::new("main", main), BranchHistory::new("topic", topic)];

    let layout = Layout::compute(&histories, &options(true)).unwrap();
    let planner = ViewPlanner::new(&layout, 20.0);

    let focused = planner.plan(ViewMode::Front, &Focus::Branch("topic".to_string()));
    assert_eq!(focused.rank_range, RankRange::new(5, 9));
    assert_eq!(focused.position.y, canonical_layer(Domain::Db));

    let all = planner.plan(ViewMode::Front, &Focus::All);
    assert_eq!(all.rank_range, RankRange::new(0, 10));

    // unknown branch falls back to the global range
    let missing = planner.plan(ViewMode::Top, &Focus::Branch("nope".to_string()));
    assert_eq!(missing.rank_range, RankRange::new(0, 10));
}

#[test]
fn test_unclassified_commit_placement_is_reproducible() {
    let build = || {
        vec![
            BranchHistory::new("main", vec![commit("root", 1, &[], None)]),
            BranchHistory::new("misc", vec![commit("3f9a2c7e", 2, &["root"], None)]),
        ]
    };
    let first = Layout::compute(&build(), &options(true)).unwrap();
    let second = Layout::compute(&build(), &options(true)).unwrap();
    let a = first.position("3f9a2c7e").unwrap();
    let b = second.position("3f9a2c7e").unwrap();
    assert_eq!(a, b);
    assert!(a.y.is_finite() && a.z.is_finite());
    assert!(a.size > 0.0);
}

#[test]
fn test_focus_flattens_offsets() {
    let histories = vec![
        BranchHistory::new("main", vec![commit("root", 1, &[], None)]),
        BranchHistory::new(
            "api",
            vec![Commit {
                commit_type: Some(CommitType::Feature),
                ..commit("f1", 2, &["root"], Some(Domain::Backend))
            }],
        ),
    ];
    let all = Layout::compute(&histories, &options(false)).unwrap();
    let focused = Layout::compute(
        &histories,
        &LayoutOptions {
            focus: Focus::Branch("api".to_string()),
            ..options(false)
        },
    )
    .unwrap();
    let lane = canonical_layer(Domain::Backend);
    let spread_all = all.position("f1").unwrap().y - lane;
    let spread_focused = focused.position("f1").unwrap().y - lane;
    assert!((spread_all - 1.0).abs() < 1e-9);
    assert!((spread_focused - 0.3).abs() < 1e-9);
}

#[test]
fn test_branch_fresh_off_main_still_gets_a_curve() {
    let main = vec![commit("m0", 100, &[], None), commit("m1", 200, &["m0"], None)];
    let histories = vec![
        BranchHistory::new("main", main.clone()),
        BranchHistory::new("fresh", main),
    ];
    let layout = Layout::compute(&histories, &options(false)).unwrap();
    let curve = layout.curve("fresh").unwrap();
    let tip = layout.position("m1").unwrap();
    let slot = layout.lanes()["fresh"];

    assert!(curve.len() >= 2);
    assert_eq!(curve[0], tip.position());
    let end = curve.last().unwrap();
    assert_eq!((end.y, end.z), (slot.lane, slot.depth));
    assert!(end.x > tip.x);
}

#[test]
fn test_inverted_size_bounds_still_compute() {
    let histories = create_test_histories();
    let options = LayoutOptions {
        placement: PlacementOptions {
            size_min: 2.0,
            size_max: 1.0,
            jitter: false,
            ..Default::default()
        },
        focus: Focus::All,
    };
    let layout = Layout::compute(&histories, &options).unwrap();
    for p in layout.positions().values() {
        assert!(p.size >= 0.5 && p.size <= 2.0, "size out of bounds: {p:?}");
    }
}

#[test]
fn test_duplicate_branch_names_share_one_slot() {
    let histories = vec![
        BranchHistory::new("main", vec![commit("m0", 1, &[], None)]),
        BranchHistory::new("api", vec![commit("a0", 2, &["m0"], Some(Domain::Backend))]),
        BranchHistory::new("api", vec![commit("a1", 3, &["a0"], Some(Domain::Backend))]),
        BranchHistory::new("svc", vec![commit("s0", 4, &["m0"], Some(Domain::Backend))]),
    ];
    let layout = Layout::compute(&histories, &options(false)).unwrap();
    let lanes = layout.lanes();
    assert_eq!(lanes["api"].depth, 2.0);
    assert_eq!(lanes["svc"].depth, -2.0);
}
