use approx::assert_relative_eq;
use ndarray::{array, Array1, Array2};
use tpa_math::{LinearRegression, LinearRegressionParams, MathError, Regressor};

#[test]
fn test_recovers_exact_linear_relation() {
    // y = 2 + 3 * x0 - 0.5 * x1
    let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 4.0], [3.0, 1.0], [4.0, 2.0]];
    let y: Array1<f64> = x
        .rows()
        .into_iter()
        .map(|r| 2.0 + 3.0 * r[0] - 0.5 * r[1])
        .collect();

    let mut model = LinearRegression::default();
    model.fit(&x, &y).unwrap();

    assert_relative_eq!(model.intercept(), 2.0, epsilon = 1e-8);
    let coefficients = model.coefficients().unwrap();
    assert_relative_eq!(coefficients[0], 3.0, epsilon = 1e-8);
    assert_relative_eq!(coefficients[1], -0.5, epsilon = 1e-8);

    let prediction = model.predict(&array![[10.0, 2.0]]).unwrap();
    assert_relative_eq!(prediction[0], 31.0, epsilon = 1e-6);
}

#[test]
fn test_without_intercept() {
    let x = array![[1.0], [2.0], [3.0]];
    let y = array![2.0, 4.0, 6.0];

    let mut model = LinearRegression::new(LinearRegressionParams {
        fit_intercept: false,
    });
    model.fit(&x, &y).unwrap();

    assert_eq!(model.intercept(), 0.0);
    assert_relative_eq!(model.coefficients().unwrap()[0], 2.0, epsilon = 1e-10);
}

#[test]
fn test_error_contract() {
    let mut model = LinearRegression::default();
    assert!(matches!(
        model.predict(&array![[1.0]]),
        Err(MathError::NotFitted(_))
    ));
    assert!(matches!(
        model.fit(&Array2::zeros((0, 1)), &Array1::zeros(0)),
        Err(MathError::InsufficientData(_))
    ));
    assert!(matches!(
        model.fit(&array![[1.0], [2.0]], &array![1.0]),
        Err(MathError::InvalidInput(_))
    ));
}
