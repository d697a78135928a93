use liga_da_firma::LeagueError;
use liga_da_firma::pitch::{self, FormationChoice, ManualLayout, Side};

fn names(n: usize, prefix: &str) -> Vec<String> {
    (1..=n).map(|i| format!("{prefix}{i}")).collect()
}

#[test]
fn auto_formation_by_headcount() {
    let picks: Vec<&str> = (3..=10).map(pitch::auto_formation_name).collect();
    assert_eq!(picks, vec!["2-2", "2-2", "2-3", "3-2-1", "2-3-1", "3-3-2", "3-3-3", "3-3-3"]);
    assert_eq!(pitch::auto_formation(6), &[10.0, 10.0, 10.0, 40.0, 60.0, 70.0]);
}

#[test]
fn coordinates_are_clamped_and_spread() {
    assert_eq!(pitch::clamp_pct(-5.0), 4.0);
    assert_eq!(pitch::clamp_pct(120.0), 96.0);
    assert_eq!(pitch::clamp_pct(f64::NAN), 50.0);
    assert_eq!(pitch::spread_x(0, 0), 50.0);
    assert_eq!(pitch::spread_x(0, 1), 50.0);
    assert_eq!(pitch::spread_x(0, 3), 25.0);
    assert_eq!(pitch::spread_x(2, 3), 75.0);
}

#[test]
fn side_b_mirrors_x() {
    let team_a = names(3, "A");
    let team_b = names(3, "B");
    let layout = pitch::layout(&team_a, &team_b, &FormationChoice::default(), &ManualLayout::default());
    assert_eq!(layout.len(), 6);
    let a1 = &layout[0];
    let b1 = &layout[3];
    assert_eq!((a1.side, a1.x, a1.y), (Side::A, 25.0, 10.0));
    assert_eq!((b1.side, b1.x, b1.y), (Side::B, 75.0, 10.0));
    assert!(!a1.manual);
}

#[test]
fn extra_athletes_beyond_the_template_sit_in_the_center() {
    let team = names(5, "A");
    let mut forms = FormationChoice::default();
    forms.set(Side::A, "2-2").unwrap();
    let layout = pitch::layout(&team, &[], &forms, &ManualLayout::default());
    assert_eq!(layout[4].y, 50.0);
}

#[test]
fn unknown_formation_is_rejected() {
    let mut forms = FormationChoice::default();
    assert_eq!(forms.set(Side::B, "4-4-2").unwrap_err(), LeagueError::UnknownFormation("4-4-2".to_string()));
    assert_eq!(forms.get(Side::B), pitch::AUTO);
    forms.set(Side::B, "1-2-1").unwrap();
    assert_eq!(forms.slots(Side::B, 9), &[10.0, 40.0, 40.0, 70.0]);
}

#[test]
fn manual_positions_win_only_when_enabled() {
    let team_b = names(2, "B");
    let mut manual = ManualLayout::default();
    manual.place(Side::B, "B1", 30.0, 99.0);
    let forms = FormationChoice::default();

    let off = pitch::layout(&[], &team_b, &forms, &manual);
    assert!(!off[0].manual);

    manual.enabled = true;
    let on = pitch::layout(&[], &team_b, &forms, &manual);
    // Manual x is kept as placed, not mirrored
    assert_eq!((on[0].x, on[0].y, on[0].manual), (30.0, 96.0, true));
    assert!(!on[1].manual);
}

#[test]
fn prune_drops_athletes_who_left() {
    let mut manual = ManualLayout::default();
    manual.place(Side::A, "Ana", 10.0, 10.0);
    manual.place(Side::A, "Bia", 20.0, 20.0);
    manual.place(Side::B, "Caio", 30.0, 30.0);
    let pruned = manual.prune(&["Ana".to_string()], &[]);
    assert_eq!(pruned, 2);
    assert!(manual.side(Side::A).contains_key("Ana"));
    assert!(manual.side(Side::B).is_empty());
}

#[test]
fn stored_layout_decodes_leniently() {
    let raw = serde_json::json!({ "enabled": true, "A": { "Ana": { "x": "12", "y": null } } });
    let manual: ManualLayout = serde_json::from_value(raw).unwrap();
    assert!(manual.enabled);
    let pos = manual.side(Side::A)["Ana"];
    assert_eq!((pos.x, pos.y), (Some(12.0), None));
    assert!(manual.side(Side::B).is_empty());
}
