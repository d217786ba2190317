use std::fs;
use tempfile::TempDir;
use tstudent::{run_analysis, AnalysisConfig, TStudentError, TestKind};

const DATA: &str = "\
sujeto,grupo_a,grupo_b,antes,despues,etiqueta
1,2,1,10,11,x
2,4,2,12,14,y
3,4,3,9,9,x
4,4,4,11,13,y
5,5,5,13,14,x
6,5,6,8,9,y
7,7,7,10,12,x
8,9,8,12,13,y
9,,,11,13,x
10,,,9,10,y
";

fn write_data(dir: &TempDir) -> String {
    let path = dir.path().join("datos.csv");
    fs::write(&path, DATA).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_two_sample_equal_variance_df() {
    let dir = TempDir::new().unwrap();
    let config = AnalysisConfig::new(write_data(&dir), TestKind::TwoSampleIndependent, "grupo_a".into())
        .with_variable2(Some("grupo_b".into()));

    let (table, analysis) = run_analysis(&config).unwrap();
    assert_eq!(table.n_rows(), 10);
    // missing cells are dropped: 8 + 8 - 2
    assert_eq!(analysis.result.degrees_of_freedom, 14);
    assert!((analysis.result.t_statistic - 0.43496).abs() < 1e-3);
}

#[test]
fn test_one_sample_df() {
    let dir = TempDir::new().unwrap();
    let config = AnalysisConfig::new(write_data(&dir), TestKind::OneSample, "antes".into())
        .with_test_value(Some(10.5));

    let (_, analysis) = run_analysis(&config).unwrap();
    assert_eq!(analysis.result.degrees_of_freedom, 9);
    assert_eq!(analysis.request.test_value, 10.5);
}

#[test]
fn test_paired_df() {
    let dir = TempDir::new().unwrap();
    let config = AnalysisConfig::new(write_data(&dir), TestKind::Paired, "antes".into())
        .with_variable2(Some("despues".into()))
        .with_alpha(Some(0.01));

    let (_, analysis) = run_analysis(&config).unwrap();
    assert_eq!(analysis.result.degrees_of_freedom, 9);
    assert!(analysis.result.t_statistic < 0.0);
    assert!(analysis.interpretation.reject_null);
}

#[test]
fn test_missing_markers_are_dropped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("marcadores.csv");
    fs::write(&path, "a\n1\nNAN\n-nan\n3\n#N/A\n5\n").unwrap();
    let config = AnalysisConfig::new(
        path.to_string_lossy().to_string(),
        TestKind::OneSample,
        "a".into(),
    );

    let (_, analysis) = run_analysis(&config).unwrap();
    assert_eq!(analysis.result.degrees_of_freedom, 2);
    assert_eq!(analysis.summaries[0].n, 3);
}

#[test]
fn test_failures_are_reported() {
    let dir = TempDir::new().unwrap();
    let data = write_data(&dir);

    let same = AnalysisConfig::new(data.clone(), TestKind::Paired, "antes".into())
        .with_variable2(Some("antes".into()));
    assert!(matches!(
        run_analysis(&same),
        Err(TStudentError::InvalidSelection { .. })
    ));

    let text = AnalysisConfig::new(data.clone(), TestKind::OneSample, "etiqueta".into());
    assert!(matches!(
        run_analysis(&text),
        Err(TStudentError::NonNumericColumn { .. })
    ));

    let json = dir.path().join("datos.json");
    fs::write(&json, "{}").unwrap();
    let unsupported = AnalysisConfig::new(
        json.to_string_lossy().to_string(),
        TestKind::OneSample,
        "antes".into(),
    );
    assert!(matches!(
        run_analysis(&unsupported),
        Err(TStudentError::UnsupportedFormat { .. })
    ));

    let missing = AnalysisConfig::new(
        dir.path().join("nope.csv").to_string_lossy().to_string(),
        TestKind::OneSample,
        "antes".into(),
    );
    assert!(matches!(run_analysis(&missing), Err(TStudentError::IO(_))));

    let pdf_only = AnalysisConfig::new(data, TestKind::OneSample, "antes".into()).with_pdf(true);
    assert!(matches!(
        run_analysis(&pdf_only),
        Err(TStudentError::InvalidConfig { .. })
    ));
}
