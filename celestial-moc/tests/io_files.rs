use celestial_moc::io::infer_format;
use celestial_moc::{Moc, MocError, MocFormat, MocType};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn sample() -> Moc {
    let mut moc = Moc::new()
        .with_name("sample")
        .with_id("ivo://EXAMPLE/sample")
        .with_origin("ivo://EXAMPLE")
        .with_type(MocType::Image);
    moc.add(3, [10, 11, 200]).unwrap();
    moc.add(8, [65535, 70000]).unwrap();
    moc
}

#[test]
fn every_format_round_trips_cells() {
    let dir = tempdir().unwrap();
    let moc = sample();

    for name in ["moc.fits", "moc.fit", "moc.json", "moc.txt", "moc.ascii"] {
        let path = dir.path().join(name);
        moc.write(&path, None).unwrap();
        let back = Moc::from_file(&path).unwrap();
        assert_eq!(back, moc, "{}", name);
    }
}

#[test]
fn fits_file_carries_metadata() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("meta.fits");
    sample().write(&path, None).unwrap();

    let back = Moc::from_file(&path).unwrap();
    assert_eq!(back.name.as_deref(), Some("sample"));
    assert_eq!(back.id.as_deref(), Some("ivo://EXAMPLE/sample"));
    assert_eq!(back.origin.as_deref(), Some("ivo://EXAMPLE"));
    assert_eq!(back.moc_type(), Some(MocType::Image));

    let mut merged = Moc::with_cells(3, [0]).unwrap();
    merged.read(&path, None).unwrap();
    assert!(merged.name.is_none());
    assert!(merged.moc_type().is_none());
    assert!(merged.contains(3, 0, false).unwrap());
    assert!(merged.contains(8, 70000, false).unwrap());
}

#[test]
fn fits_file_is_block_aligned() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("aligned.fits");
    sample().write(&path, None).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len() % 2880, 0);
    assert!(bytes.starts_with(b"SIMPLE  ="));
}

#[test]
fn format_from_content_without_suffix() {
    let dir = tempdir().unwrap();
    let moc = sample();

    for (format, name) in [
        (MocFormat::Fits, "fits_data"),
        (MocFormat::Json, "json_data"),
        (MocFormat::Ascii, "text_data"),
    ] {
        let path = dir.path().join(name);
        moc.write(&path, Some(format)).unwrap();
        assert_eq!(infer_format(&path).unwrap(), format);
        assert_eq!(Moc::from_file(&path).unwrap(), moc);
    }
}

#[test]
fn suffix_wins_over_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("upper.JSON");
    fs::write(&path, r#"{"2":[7]}"#).unwrap();
    assert_eq!(infer_format(&path).unwrap(), MocFormat::Json);
    assert_eq!(Moc::from_file(&path).unwrap(), Moc::with_cells(2, [7]).unwrap());
}

#[test]
fn unknown_formats() {
    let dir = tempdir().unwrap();
    let odd = dir.path().join("notes");
    fs::write(&odd, "hello").unwrap();

    assert!(matches!(infer_format(&odd), Err(MocError::UnknownFormat(_))));
    assert!(matches!(
        infer_format(Path::new("/nonexistent/coverage")),
        Err(MocError::UnknownFormat(_))
    ));
    assert!(matches!(
        sample().write(dir.path().join("out.bin"), None),
        Err(MocError::UnknownFormat(_))
    ));
}

#[test]
fn explicit_format_overrides_suffix() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("coverage.dat");
    sample().write(&path, Some(MocFormat::Ascii)).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "3/10,11,200 8/65535,70000");

    let mut moc = Moc::new();
    moc.read(&path, Some(MocFormat::Ascii)).unwrap();
    assert_eq!(moc, sample());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = Moc::from_file(dir.path().join("absent.fits")).unwrap_err();
    assert!(matches!(err, MocError::Io(_)));
}
