mod common;

use std::fs;
use std::path::Path;

use common::TestDir;
use holdings_pivot::app::approot::{
    run_pivot_app, MalformedPolicy, Options, RunSummary,
};
use holdings_pivot::app::outfmt::csv::CsvWriter;
use holdings_pivot::app::outfmt::model::SheetWriter;
use holdings_pivot::statement::SchemaProfile;
use holdings_pivot::testlib::assert_vec_eq;
use holdings_pivot::util::basic::SError;
use holdings_pivot::util::rw::WriteHandle;

const EXPORT_COLUMN_HEADER: &str =
    "Symbol,Market,Security,Quantity,Avg Cost,Price,Book Value,\
     Market Value,Unrealized $,Gain/Loss %,% of Holdings";

fn write_export_file(
    dir: &Path,
    name: &str,
    date_time: &str,
    account_desc: &str,
    security_rows: &[&str],
) {
    let mut lines = vec![
        format!("As of Date,{date_time}"),
        format!("Account,{account_desc}"),
        "Cash Balance (after settlement),1000.00,,,,".to_string(),
        "Securities Market Value,2500.00,,,,".to_string(),
        "Total Account Value,3500.00,,,,".to_string(),
        "Margin Available (as of yesterday),N/A,,,,".to_string(),
        String::new(),
        EXPORT_COLUMN_HEADER.to_string(),
    ];
    for row in security_rows {
        lines.push(row.to_string());
    }
    fs::write(dir.join(name), lines.join("\n") + "\n").unwrap();
}

fn security_row(symbol: &str, desc: &str) -> String {
    format!(
        "{symbol},CDN,{desc},100,20.00,25.00,2000.00,2500.00,500.00,25.00,50.0"
    )
}

fn options_for(dir: &TestDir, on_malformed: MalformedPolicy) -> Options {
    Options {
        source_dir: dir.path.clone(),
        output_path: dir.path.join("consolidated.csv"),
        offline_path: dir.path.join("offline.csv"),
        categories_path: dir.path.join("categories.csv"),
        profile: SchemaProfile::webbroker(),
        on_malformed,
    }
}

fn run_csv_pipeline(
    dir: &TestDir,
    on_malformed: MalformedPolicy,
) -> Result<RunSummary, SError> {
    let options = options_for(dir, on_malformed);
    let sink: Box<dyn SheetWriter> =
        Box::new(CsvWriter::new(&options.output_path));

    let (out, _out_buff) = WriteHandle::string_buff_write_handle();
    let (err, err_buff) = WriteHandle::string_buff_write_handle();
    let res = run_pivot_app(&options, sink, out, err);
    if res.is_ok() && on_malformed == MalformedPolicy::Abort {
        assert_eq!(err_buff.borrow().as_str(), "");
    }
    res
}

fn output_lines(dir: &TestDir) -> Vec<String> {
    fs::read_to_string(dir.path.join("consolidated.csv"))
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn test_single_cash_account_statement() {
    let dir = TestDir::new("cash");
    write_export_file(
        &dir.path,
        "538R77A-21-Oct-2016.csv",
        "2016-10-21 11:17:48",
        "TD Direct Investing - 538R77A",
        &[&security_row("XIC", "ISHARES CORE SP TSX")],
    );

    let summary = run_csv_pipeline(&dir, MalformedPolicy::Abort).unwrap();
    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.extracted_rows, 1);
    assert_eq!(summary.offline_rows, 0);
    assert_eq!(
        summary.new_securities,
        vec!["ISHARES CORE SP TSX".to_string()]
    );

    assert_vec_eq(
        output_lines(&dir),
        vec![
            "Date,Account,Account Type,Symbol,Market,Security,Quantity,\
             Price,Category,Book Value,Market Value,Unrealized $,Gain/Loss %"
                .to_string(),
            "2016-10-21,538R77A,Cash,XIC,CDN,ISHARES CORE SP TSX,100,\
             25.00,,2000.00,2500.00,500.00,25.00"
                .to_string(),
        ],
    );

    // The offline table was seeded with the header only.
    let offline = fs::read_to_string(dir.path.join("offline.csv")).unwrap();
    assert_eq!(offline.lines().count(), 1);

    // The new security landed in the category table as undefined.
    let categories =
        fs::read_to_string(dir.path.join("categories.csv")).unwrap();
    assert_eq!(
        categories,
        "Security,Category\nISHARES CORE SP TSX,undefined\n"
    );
}

#[test]
fn test_sdrsp_account_statement() {
    let dir = TestDir::new("sdrsp");
    write_export_file(
        &dir.path,
        "538R77S-21-Oct-2016.csv",
        "2016-10-21 11:17:48",
        "TD Direct Investing - 538R77S",
        &[&security_row("XIC", "ISHARES CORE SP TSX")],
    );

    run_csv_pipeline(&dir, MalformedPolicy::Abort).unwrap();

    let lines = output_lines(&dir);
    assert_eq!(lines.len(), 2);
    assert!(
        lines[1].starts_with("2016-10-21,538R77S,SDRSP,"),
        "unexpected data row: {}",
        lines[1]
    );
}

#[test]
fn test_two_files_and_empty_offline_table() {
    let dir = TestDir::new("two-files");
    write_export_file(
        &dir.path,
        "538R77A-21-Oct-2016.csv",
        "2016-10-21 11:17:48",
        "TD Direct Investing - 538R77A",
        &[
            &security_row("XIC", "ISHARES CORE SP TSX"),
            &security_row("RY", "ROYAL BANK OF CANADA"),
            &security_row("ENB", "ENBRIDGE INC"),
        ],
    );
    write_export_file(
        &dir.path,
        "538R77J-21-Oct-2016.csv",
        "2016-10-21 11:17:48",
        "TD Direct Investing - 538R77J",
        &[
            &security_row("MSFT", "MICROSOFT CORP"),
            &security_row("AAPL", "APPLE INC"),
            &security_row("XBB", "ISHARES CORE CDN BOND"),
            &security_row("VTI", "VANGUARD TOTAL MARKET"),
            &security_row("GOOG", "ALPHABET INC"),
        ],
    );

    let summary = run_csv_pipeline(&dir, MalformedPolicy::Abort).unwrap();
    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.extracted_rows, 8);
    assert_eq!(summary.offline_rows, 0);

    // Header plus 3 + 5 data rows. Cross-file ordering is walk order and
    // deliberately unasserted; rows within a file stay in file order.
    let lines = output_lines(&dir);
    assert_eq!(lines.len(), 1 + 3 + 5);
    let xic = lines.iter().position(|l| l.contains(",XIC,")).unwrap();
    let ry = lines.iter().position(|l| l.contains(",RY,")).unwrap();
    let enb = lines.iter().position(|l| l.contains(",ENB,")).unwrap();
    assert!(xic < ry && ry < enb);
}

#[test]
fn test_offline_rows_are_appended_and_categorized() {
    let dir = TestDir::new("offline-merge");
    write_export_file(
        &dir.path,
        "538R77A-21-Oct-2016.csv",
        "2016-10-21 11:17:48",
        "TD Direct Investing - 538R77A",
        &[&security_row("XIC", "ISHARES CORE SP TSX")],
    );

    // Seed, then simulate the operator adding two offline rows.
    run_csv_pipeline(&dir, MalformedPolicy::Abort).unwrap();
    let offline_path = dir.path.join("offline.csv");
    let seeded = fs::read_to_string(&offline_path).unwrap();
    fs::write(
        &offline_path,
        seeded
            + "2016-10-21,MANUAL,Cash,GIC1,,SOME LOCKED-IN GIC,1,5000.00,\
               fixed income,5000.00,5000.00,0.00,0.00\n\
               2016-10-21,MANUAL,Cash,GIC2,,ANOTHER GIC,1,1000.00,,\
               1000.00,1000.00,0.00,0.00\n",
    )
    .unwrap();

    let summary = run_csv_pipeline(&dir, MalformedPolicy::Abort).unwrap();
    assert_eq!(summary.extracted_rows, 1);
    assert_eq!(summary.offline_rows, 2);

    let lines = output_lines(&dir);
    assert_eq!(lines.len(), 1 + 1 + 2);
    // Offline rows come after all extracted rows, in their own order,
    // keeping an assigned category and leaving an empty one empty.
    assert!(lines[2].contains("SOME LOCKED-IN GIC"));
    assert!(lines[2].contains("fixed income"));
    assert!(lines[3].contains("ANOTHER GIC"));

    // Offline descriptions joined the category table mapped to themselves.
    let categories =
        fs::read_to_string(dir.path.join("categories.csv")).unwrap();
    assert!(categories.contains("SOME LOCKED-IN GIC,undefined"));
    assert!(categories.contains("ANOTHER GIC,undefined"));
    assert!(categories.contains("ISHARES CORE SP TSX,undefined"));
}

#[test]
fn test_rerun_is_idempotent() {
    let dir = TestDir::new("rerun");
    write_export_file(
        &dir.path,
        "538R77A-21-Oct-2016.csv",
        "2016-10-21 11:17:48",
        "TD Direct Investing - 538R77A",
        &[
            &security_row("XIC", "ISHARES CORE SP TSX"),
            &security_row("RY", "ROYAL BANK OF CANADA"),
        ],
    );

    run_csv_pipeline(&dir, MalformedPolicy::Abort).unwrap();

    // Operator assigns a category between runs.
    let categories_path = dir.path.join("categories.csv");
    let categories = fs::read_to_string(&categories_path)
        .unwrap()
        .replace(
            "ISHARES CORE SP TSX,undefined",
            "ISHARES CORE SP TSX,Canadian equity",
        );
    fs::write(&categories_path, &categories).unwrap();

    let categories_before = fs::read(&categories_path).unwrap();
    let consolidated_before =
        fs::read(dir.path.join("consolidated.csv")).unwrap();

    let summary = run_csv_pipeline(&dir, MalformedPolicy::Abort).unwrap();
    assert!(summary.new_securities.is_empty());

    // No new securities: the category table is byte-for-byte untouched,
    // including the operator's assignment, and the consolidated output
    // reproduces itself.
    assert_eq!(fs::read(&categories_path).unwrap(), categories_before);
    assert_eq!(
        fs::read(dir.path.join("consolidated.csv")).unwrap(),
        consolidated_before
    );
}

#[test]
fn test_malformed_file_policies() {
    let dir = TestDir::new("malformed");
    write_export_file(
        &dir.path,
        "538R77A-21-Oct-2016.csv",
        "2016-10-21 11:17:48",
        "TD Direct Investing - 538R77A",
        &[&security_row("XIC", "ISHARES CORE SP TSX")],
    );
    fs::write(dir.path.join("random.csv"), "some,random\ncsv,file\n")
        .unwrap();

    // Default strictness: the first malformed file kills the run.
    let err = run_csv_pipeline(&dir, MalformedPolicy::Abort).unwrap_err();
    assert!(err.contains("random.csv"), "unexpected error: {err}");

    // Skip policy: the good file still goes through.
    let summary = run_csv_pipeline(&dir, MalformedPolicy::Skip).unwrap();
    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.extracted_rows, 1);
}

#[test]
fn test_empty_tree_reports_no_files() {
    let dir = TestDir::new("empty");

    let options = options_for(&dir, MalformedPolicy::Abort);
    let sink: Box<dyn SheetWriter> =
        Box::new(CsvWriter::new(&options.output_path));
    let (out, out_buff) = WriteHandle::string_buff_write_handle();
    let (err, _) = WriteHandle::string_buff_write_handle();

    let summary = run_pivot_app(&options, sink, out, err).unwrap();
    assert_eq!(summary.files_processed, 0);
    assert_eq!(summary.extracted_rows, 0);
    assert!(out_buff.borrow().as_str().contains("No export csv files found"));

    // Header-only consolidated output, seeded offline table, empty
    // category table: all still written.
    assert_eq!(output_lines(&dir).len(), 1);
    assert!(dir.path.join("offline.csv").exists());
    assert_eq!(
        fs::read_to_string(dir.path.join("categories.csv")).unwrap(),
        "Security,Category\n"
    );
}
