//! CSV 批量转换测试

use mood_corpus::convert::{convert_folder, ConvertOptions};
use mood_corpus::sheet::read_table;
use std::fs;
use tempfile::tempdir;

fn options(input: &std::path::Path, output: &std::path::Path) -> ConvertOptions {
    ConvertOptions {
        input_dir: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        recursive: false,
        overwrite: false,
    }
}

#[test]
fn test_convert_and_skip_existing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("csv");
    let output = dir.path().join("xlsx");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("a.csv"), "Comment\nI feel sad\nI am fine\n").unwrap();
    fs::write(input.join("b.csv"), "x,y\n1,2\n").unwrap();

    let summary = convert_folder(&options(&input, &output)).unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.skipped, 0);
    assert_eq!(read_table(&output.join("a.xlsx")).unwrap().len(), 2);

    let again = convert_folder(&options(&input, &output)).unwrap();
    assert_eq!(again.converted, 0);
    assert_eq!(again.skipped, 2);

    let mut overwrite = options(&input, &output);
    overwrite.overwrite = true;
    assert_eq!(convert_folder(&overwrite).unwrap().converted, 2);
}

#[test]
fn test_recursive_mirrors_folders() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data");
    let output = input.join("EXCEL转换结果");
    fs::create_dir_all(input.join("2023").join("03")).unwrap();
    fs::write(input.join("top.csv"), "a\n1\n").unwrap();
    fs::write(input.join("2023").join("03").join("deep.CSV"), "a\n2\n").unwrap();

    let mut opts = options(&input, &output);
    opts.recursive = true;
    let summary = convert_folder(&opts).unwrap();

    assert_eq!(summary.converted, 2);
    assert!(output.join("top.xlsx").exists());
    assert!(output.join("2023").join("03").join("deep.xlsx").exists());
}

#[test]
fn test_bad_file_counted_not_fatal() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("csv");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("good.csv"), "a,b\n1,2\n").unwrap();
    fs::write(input.join("bad.csv"), "a,b\n1,2,3,4\n").unwrap();

    let summary = convert_folder(&options(&input, &dir.path().join("out"))).unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed, 1);
}

#[test]
fn test_empty_folder() {
    let dir = tempdir().unwrap();
    let summary = convert_folder(&options(dir.path(), &dir.path().join("out"))).unwrap();
    assert_eq!(summary.total, 0);
}

#[test]
fn test_trailing_blank_rows_kept() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("csv");
    let output = dir.path().join("xlsx");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("comments.csv"), "Comment\nhello\n\"\"\n\"\"\n").unwrap();

    let summary = convert_folder(&options(&input, &output)).unwrap();
    assert_eq!(summary.converted, 1);
    assert_eq!(read_table(&output.join("comments.xlsx")).unwrap().len(), 3);
}
