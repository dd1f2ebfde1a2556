use super::*;

const EPSILON: f32 = 1e-6;

#[test]
fn euclidean_distance_is_l2() {
    assert!((euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < EPSILON);
    assert_eq!(euclidean_distance(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
}

#[test]
fn cosine_distance_ignores_magnitude() {
    let distance = cosine_distance(&[1.0, 0.0], &[10.0, 0.0]);
    assert!(distance.abs() < EPSILON);

    let orthogonal = cosine_distance(&[1.0, 0.0], &[0.0, 2.0]);
    assert!((orthogonal - 1.0).abs() < EPSILON);

    let opposite = cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]);
    assert!((opposite - 2.0).abs() < EPSILON);
}

#[test]
fn cosine_distance_with_zero_vector_is_nan() {
    assert!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]).is_nan());
}

#[test]
fn metrics_are_distinct() {
    let a = [1.0, 0.0];
    let b = [5.0, 0.0];
    assert!(DistanceMetric::Cosine.distance(&a, &b).abs() < EPSILON);
    assert!((DistanceMetric::Euclidean.distance(&a, &b) - 4.0).abs() < EPSILON);
}

#[test]
fn metric_parsing() {
    use clap::ValueEnum;

    assert_eq!(
        DistanceMetric::from_str("cosine", false),
        Ok(DistanceMetric::Cosine)
    );
    assert_eq!(
        DistanceMetric::from_str("EUCLIDEAN", true),
        Ok(DistanceMetric::Euclidean)
    );
    assert_eq!(
        DistanceMetric::from_str("l2", false),
        Ok(DistanceMetric::Euclidean)
    );
    assert!(DistanceMetric::from_str("dot", false).is_err());
    assert_eq!(DistanceMetric::Euclidean.to_string(), "euclidean");
    assert_eq!(DistanceMetric::default(), DistanceMetric::Cosine);
}

#[test]
fn metric_serde_names() {
    let json = serde_json::to_string(&DistanceMetric::Euclidean).expect("serializes");
    assert_eq!(json, "\"euclidean\"");
    let parsed: DistanceMetric = serde_json::from_str("\"cosine\"").expect("parses");
    assert_eq!(parsed, DistanceMetric::Cosine);
    let alias: DistanceMetric = serde_json::from_str("\"l2\"").expect("parses");
    assert_eq!(alias, DistanceMetric::Euclidean);
}
