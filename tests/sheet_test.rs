//! 表格读写测试

use mood_corpus::error::CorpusError;
use mood_corpus::sheet::{read_table, write_table};
use mood_corpus_common::{Cell, Table};
use tempfile::tempdir;

/// CSV → xlsx 后行数和非空值不变
#[test]
fn test_csv_to_xlsx_round_trip() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("QA1.csv");
    std::fs::write(
        &csv_path,
        "question,answer,age\n孩子最近抑郁,建议就医,14\n\"逗号,引号\",,16\n失眠,多休息,\n",
    )
    .unwrap();

    let table = read_table(&csv_path).unwrap();
    assert_eq!(table.len(), 3);

    let xlsx_path = dir.path().join("out").join("QA1.xlsx");
    write_table(&xlsx_path, &table).unwrap();
    let reloaded = read_table(&xlsx_path).unwrap();

    assert_eq!(reloaded.headers(), table.headers());
    assert_eq!(reloaded.len(), table.len());
    for row in 0..table.len() {
        for column in 0..table.headers().len() {
            let original = table.cell(row, column);
            if !original.is_blank() {
                assert_eq!(reloaded.cell(row, column), original, "row {} column {}", row, column);
            }
        }
    }
    assert_eq!(reloaded.cell(1, 0), &Cell::Text("逗号,引号".into()));
    assert_eq!(reloaded.cell(0, 2), &Cell::Number(14.0));
}

/// GBK 编码的 CSV 回退解码
#[test]
fn test_gbk_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gbk.csv");
    let (bytes, _, _) = encoding_rs::GBK.encode("问题,回答\n孩子抑郁,建议就医\n");
    std::fs::write(&path, &bytes).unwrap();

    let table = read_table(&path).unwrap();
    assert_eq!(table.headers(), &["问题", "回答"]);
    assert_eq!(table.row(0).unwrap().text("回答"), "建议就医");
}

/// 写入时不留下临时文件，覆盖已有文件
#[test]
fn test_write_replaces_existing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("result.xlsx");

    let first = Table::from_rows(vec!["a".into()], vec![vec!["1".into()], vec!["2".into()]]);
    write_table(&path, &first).unwrap();
    let second = Table::from_rows(vec!["a".into()], vec![vec!["only".into()]]);
    write_table(&path, &second).unwrap();

    assert_eq!(read_table(&path).unwrap().len(), 1);
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

/// 缺少列时报出列名
#[test]
fn test_missing_column_named() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.csv");
    std::fs::write(&path, "id,text\n1,hello\n").unwrap();

    let table = read_table(&path).unwrap();
    let err: CorpusError = table.require_column("Comment").unwrap_err().into();
    assert!(format!("{}", err).contains("Comment"));
}

#[test]
fn test_unsupported_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.pdf");
    std::fs::write(&path, "%PDF").unwrap();

    assert!(matches!(read_table(&path), Err(CorpusError::UnsupportedFormat(_))));
}

/// 末尾的全空行写入 xlsx 后仍然保留
#[test]
fn test_trailing_blank_rows_survive() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("QA2.csv");
    std::fs::write(&csv_path, "question,answer\nq1,a1\n,\n,\n").unwrap();

    let table = read_table(&csv_path).unwrap();
    assert_eq!(table.len(), 3);

    let xlsx_path = dir.path().join("QA2.xlsx");
    write_table(&xlsx_path, &table).unwrap();
    let reloaded = read_table(&xlsx_path).unwrap();

    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded.cell(0, 1), &Cell::Text("a1".into()));
    assert!(reloaded.cell(2, 0).is_blank());
    assert!(reloaded.cell(2, 1).is_blank());
}
