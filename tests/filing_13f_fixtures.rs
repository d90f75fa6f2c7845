mod common;

use common::{init_tracing, read_fixture};
use edgar13f::parsing::thirteenf::INFORMATION_TABLE;
use edgar13f::{Filing, Filing13F, HoldingsSource, TableConfig, extract_holdings, extract_metadata};

const XML_FILING: &str = "filings/raw_filing_1.txt";
const TEXT_FILING: &str = "filings/raw_filing_2.txt";
const DEFAULT_NAMESPACE_FILING: &str = "filings/raw_filing_3.txt";

fn processed(fixture: &str) -> Filing13F {
    init_tracing();
    let mut filing = Filing13F::new(&read_fixture(fixture));
    assert!(filing.process(), "{} should process", fixture);
    filing
}

#[test]
fn split_xml_filing() {
    let filing = Filing::new(&read_fixture(XML_FILING));

    assert_eq!(filing.header().len(), 899);
    assert!(filing.header().contains("ACCESSION NUMBER:\t\t0000919574-18-001804"));
    assert_eq!(filing.document_types().collect::<Vec<_>>(), vec!["13F-HR", INFORMATION_TABLE]);
    assert_eq!(filing.document("13F-HR").map(str::len), Some(1972));
    assert_eq!(filing.document(INFORMATION_TABLE).map(str::len), Some(59127));
}

#[test]
fn split_text_filing() {
    let filing = Filing::new(&read_fixture(TEXT_FILING));

    assert_eq!(filing.header().len(), 822);
    assert_eq!(filing.document_count(), 1);
    assert_eq!(filing.document("13F-HR").map(str::len), Some(11229));
    assert!(!filing.has_document(INFORMATION_TABLE));
}

#[test]
fn xml_filing_holdings() {
    let filing = processed(XML_FILING);
    let holdings = filing.holdings();

    assert_eq!(holdings.len(), 111);

    let dxc = &holdings[25];
    assert_eq!(dxc.name_of_issuer, "DXC TECHNOLOGY CO");
    assert_eq!(dxc.title_of_class, "COM");
    assert_eq!(dxc.cusip, "23355L106");
    assert_eq!(dxc.value, 5_731_000);
    assert_eq!(dxc.number, 60389);
    assert_eq!(dxc.share_type, "SH");

    let first = &holdings[0];
    assert_eq!(first.name_of_issuer, "KESTREL LAKESIDE LTD");
    assert_eq!(first.title_of_class, "CALL");
    assert_eq!(first.value, 17_711_000);
    assert_eq!(first.share_type, "PRN");
}

#[test]
fn xml_filing_metadata() {
    let filing = processed(XML_FILING);
    let metadata = filing.metadata();

    assert_eq!(metadata.accession_number.as_deref(), Some("0000919574-18-001804"));
    assert_eq!(metadata.submission_type.as_deref(), Some("13F-HR"));
    assert_eq!(
        metadata.manager_name.as_deref(),
        Some("KINGDON CAPITAL MANAGEMENT, L.L.C.")
    );
    assert_eq!(metadata.cik.as_deref(), Some("0001000097"));
    assert_eq!(metadata.file_number.as_deref(), Some("028-05103"));

    // Cover page values replace the upper-cased header ones.
    let address = &metadata.business_address;
    assert_eq!(address.street1, "152 West 57th Street");
    assert_eq!(address.street2.as_deref(), Some("50th Floor"));
    assert_eq!(address.city, "New York");
    assert_eq!(address.state_or_country, "NY");
    assert_eq!(address.zip_code, "10019");

    assert_eq!(metadata.period_of_report.unwrap().to_string(), "2017-12-31");
    assert_eq!(metadata.signature_date.unwrap().to_string(), "2018-02-14");

    // The mail address only exists in the SEC header.
    assert_eq!(metadata.mail_address.street1, "152 WEST 57TH STREET");
}

#[test]
fn text_filing_holdings() {
    let filing = processed(TEXT_FILING);
    let holdings = filing.holdings();

    assert_eq!(holdings.len(), 117);

    let baxter = &holdings[14];
    assert_eq!(baxter.name_of_issuer, "BAXTER INTERNATIONAL");
    assert_eq!(baxter.title_of_class, "COM");
    assert_eq!(baxter.cusip, "071813109");
    assert_eq!(baxter.value, 16_017_000);
    assert_eq!(baxter.number, 255_000);
    assert_eq!(baxter.share_type, "SH");

    // Last row of the second page, after the repeated column header.
    let wilmington = &holdings[116];
    assert_eq!(wilmington.name_of_issuer, "WILMINGTON TRUST CORP.");
    assert_eq!(wilmington.title_of_class, "COM");
    assert_eq!(wilmington.cusip, "971807102");
    assert_eq!(wilmington.value, 10_133_000);
    assert_eq!(wilmington.number, 210_000);
    assert_eq!(wilmington.share_type, "SH");

    let first = &holdings[0];
    assert_eq!(first.title_of_class, "CONV PFD");
    assert_eq!(first.cusip, "55565K621");
    assert_eq!(first.value, 56_614_000);
    assert_eq!(first.number, 891_298);
}

#[test]
fn text_filing_metadata() {
    let filing = processed(TEXT_FILING);
    let metadata = filing.metadata();

    assert_eq!(metadata.accession_number.as_deref(), Some("0000002230-00-000003"));
    assert_eq!(metadata.manager_name.as_deref(), Some("ADAMS EXPRESS CO"));
    assert_eq!(metadata.cik.as_deref(), Some("0000002230"));
    assert_eq!(metadata.form_type.as_deref(), Some("13F-HR"));

    let address = &metadata.business_address;
    assert_eq!(address.street1, "SEVEN ST PAUL ST STE 1140");
    assert_eq!(address.street2, None);
    assert_eq!(address.city, "BALTIMORE");
    assert_eq!(address.state_or_country, "MD");
    assert_eq!(address.zip_code, "21202");
    assert_eq!(metadata.mail_address.street2.as_deref(), Some("SUITE 1140"));

    assert_eq!(metadata.period_of_report.unwrap().to_string(), "1999-12-31");
    assert_eq!(metadata.signature_date.unwrap().to_string(), "2000-02-15");
}

#[test]
fn default_namespace_filing() {
    let filing = processed(DEFAULT_NAMESPACE_FILING);
    let metadata = filing.metadata();

    assert_eq!(metadata.accession_number.as_deref(), Some("0000007789-19-000010"));
    assert_eq!(metadata.manager_name.as_deref(), Some("ASSOCIATED BANC-CORP"));
    assert_eq!(metadata.business_address.street1, "433 MAIN STREET");
    assert_eq!(metadata.business_address.street2, None);
    assert_eq!(metadata.business_address.city, "GREEN BAY");
    assert_eq!(metadata.business_address.state_or_country, "WI");
    assert_eq!(metadata.business_address.zip_code, "54301");
    assert_eq!(metadata.cik.as_deref(), Some("0000007789"));
    assert_eq!(metadata.period_of_report.unwrap().to_string(), "2018-12-31");
    assert_eq!(metadata.signature_date.unwrap().to_string(), "2019-02-13");

    // 42 rows, one of which reports a put alongside its share amount and is dropped.
    let holdings = filing.holdings();
    assert_eq!(holdings.len(), 41);
    assert!(holdings.iter().all(|h| h.name_of_issuer != "CASCADE DELTA TR"));
    assert_eq!(holdings[17].name_of_issuer, "ALPHA HARBOR CO");

    let note = &holdings[5];
    assert_eq!(note.name_of_issuer, "ORCHARD CASCADE CORP");
    assert_eq!(note.title_of_class, "NOTE 2.000% 6/1");
    assert_eq!(note.cusip, "33884W909");
    assert_eq!(note.value, 4_971_000);
    assert_eq!(note.number, 3551);
    assert_eq!(note.share_type, "PRN");
}

#[test]
fn free_functions_match_processing() {
    let raw = read_fixture(TEXT_FILING);
    let filing = Filing::from(raw.as_str());

    assert!(matches!(HoldingsSource::detect(&filing), HoldingsSource::TextTable(_)));
    assert_eq!(extract_holdings(&filing).unwrap().len(), 117);
    assert_eq!(
        extract_metadata(&filing).unwrap().manager_name.as_deref(),
        Some("ADAMS EXPRESS CO")
    );
}

#[test]
fn max_entries_limits_holdings() {
    let config = TableConfig {
        max_entries: Some(10),
        ..Default::default()
    };
    for fixture in [XML_FILING, TEXT_FILING] {
        let mut filing = Filing13F::new(&read_fixture(fixture)).with_config(config.clone());
        assert!(filing.process());
        assert_eq!(filing.holdings().len(), 10);
    }
}

#[test]
fn holdings_serialize_with_type_key() {
    let filing = processed(TEXT_FILING);
    let json = serde_json::to_value(&filing.holdings()[14]).unwrap();

    assert_eq!(json["cusip"], "071813109");
    assert_eq!(json["value"], 16_017_000);
    assert_eq!(json["type"], "SH");
}
