use approx::assert_abs_diff_eq;
use ferroclass::datasets::{make_blobs, make_xor};
use ferroclass::prelude::*;

fn two_blobs() -> (Tensor<f64>, Vec<Label>) {
    make_blobs(100, &[vec![-5.0, -5.0], vec![5.0, 5.0]], 0.5, 42).unwrap()
}

fn training_accuracy<C: Classifier<f64>>(model: &mut C, x: &Tensor<f64>, y: &[Label]) -> f64 {
    model.fit(x, y).unwrap();
    accuracy(y, &model.predict(x).unwrap()).unwrap()
}

#[test]
fn knn_k1_recovers_training_labels() {
    let (x, y) = make_blobs(60, &[vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 0.0]], 1.0, 3).unwrap();
    let mut knn = KNNClassifier::<f64>::new(1, DistanceMetric::Euclidean).unwrap();
    knn.fit(&x, &y).unwrap();
    assert_eq!(knn.predict(&x).unwrap(), y);
}

#[test]
fn perceptron_separates_two_blobs() {
    let (x, y) = two_blobs();
    let mut p = Perceptron::<f64>::new(0.01, 100).unwrap();
    assert_eq!(training_accuracy(&mut p, &x, &y), 1.0);
    assert_eq!(p.errors_per_epoch().last(), Some(&0));
}

#[test]
fn every_classifier_fits_blobs() {
    let (x, y) = two_blobs();
    let mut models: Vec<Box<dyn Classifier<f64>>> = vec![
        Box::new(KNNClassifier::<f64>::new(5, DistanceMetric::Manhattan).unwrap()),
        Box::new(MultiClassPerceptron::<f64>::new(0.01, 50).unwrap()),
        Box::new(
            MLPClassifier::<f64>::from_config(&MlpConfig {
                hidden_sizes: vec![8],
                learning_rate: 0.05,
                n_epochs: 100,
                ..MlpConfig::default()
            })
            .unwrap(),
        ),
        Box::new(GaussianNB::<f64>::univariate()),
        Box::new(GaussianNB::<f64>::multivariate()),
    ];
    for model in models.iter_mut() {
        let acc = training_accuracy(model, &x, &y);
        assert!(acc > 0.95, "{} reached {}", model.name(), acc);
        let proba = model.predict_proba(&x).unwrap();
        assert_eq!(proba.shape_vec(), vec![100, 2]);
        for row in proba.rows() {
            assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn mlp_beats_linear_model_on_xor() {
    let (x, y) = make_xor().unwrap();
    let mut mlp = MLPClassifier::<f64>::from_config(&MlpConfig {
        hidden_sizes: vec![8],
        activation: "tanh".into(),
        learning_rate: 0.5,
        n_epochs: 2000,
        batch_size: 4,
        ..MlpConfig::default()
    })
    .unwrap();
    assert!(training_accuracy(&mut mlp, &x, &y) >= 0.75);

    let mut linear = MultiClassPerceptron::<f64>::new(0.1, 100).unwrap();
    assert!(training_accuracy(&mut linear, &x, &y) <= 0.75);
}

#[test]
fn perfect_predictions_score_one() {
    let y: Vec<Label> = vec![0, 1, 2, 2, 1, 0, 1];
    for average in [Average::Macro, Average::Micro, Average::Weighted] {
        assert_abs_diff_eq!(precision(&y, &y, average, 0.0).unwrap(), 1.0);
        assert_abs_diff_eq!(recall(&y, &y, average, 0.0).unwrap(), 1.0);
        assert_abs_diff_eq!(f1(&y, &y, average, 0.0).unwrap(), 1.0);
    }
    let binary: Vec<Label> = vec![0, 1, 1, 0];
    assert_abs_diff_eq!(f1(&binary, &binary, Average::Binary, 0.0).unwrap(), 1.0);
    assert_abs_diff_eq!(accuracy(&y, &y).unwrap(), 1.0);
}

#[test]
fn scaler_round_trip() {
    let (x, _) = two_blobs();
    let mut scaler = StandardScaler::<f64>::new();
    let scaled = scaler.fit_transform(&x).unwrap();
    for column in scaled.mean_axis0().unwrap() {
        assert_abs_diff_eq!(column, 0.0, epsilon = 1e-9);
    }
    let restored = scaler.inverse_transform(&scaled).unwrap();
    for (a, b) in restored.data().iter().zip(x.data()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-9);
    }
}
