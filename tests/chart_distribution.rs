use dice_bias::chart::{IdealRounding, distribution};

#[test]
fn exact_ideal_is_total_over_sides() {
    let points = distribution(&[1, 1, 2], 4, IdealRounding::Exact);
    assert_eq!(points.len(), 4);
    let counts: Vec<u64> = points.iter().map(|p| p.count).collect();
    assert_eq!(counts, vec![2, 1, 0, 0]);
    assert!(points.iter().all(|p| p.ideal == Some(0.75)));
    assert_eq!(points[3].value, 4);
}

#[test]
fn ceil_rounds_ideal_up() {
    let points = distribution(&[1, 1, 2], 4, IdealRounding::Ceil);
    assert!(points.iter().all(|p| p.ideal == Some(1.0)));
}

#[test]
fn no_rolls_means_no_ideal() {
    let points = distribution(&[], 6, IdealRounding::Exact);
    assert_eq!(points.len(), 6);
    assert!(points.iter().all(|p| p.count == 0 && p.ideal.is_none()));

    let v = serde_json::to_value(&points[0]).unwrap();
    assert!(v.get("ideal").is_none());
    assert_eq!(v["value"], 1);
}
