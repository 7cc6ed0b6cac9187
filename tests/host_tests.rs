//! Host construction, indexing and mutation behavior, plus the IDNA
//! round-trip properties.

use domainsplit::*;

#[test]
fn test_construction_normalizes() {
    let cases = vec![
        ("EXAMPLE.COM", "example.com"),
        ("b%C3%A9b%C3%A9.be", "bébé.be"),
        ("example.com.", "example.com."),
        ("食狮.中国", "食狮.中国"),
        ("xn--85x722f.cn", "xn--85x722f.cn"),
    ];
    for (input, expected) in cases {
        let host = Host::parse(input).unwrap();
        assert_eq!(host.content(), Some(expected), "normalization of {input}");
    }
}

#[test]
fn test_invalid_hosts_are_rejected() {
    let cases = vec![
        ".",            // no label at all
        "a..b",         // interior empty label
        "-bad.com",     // leading hyphen
        "bad-.com",     // trailing hyphen
        "ex ample.com", // space under STD3
        "example.123",  // all-numeric top label
    ];
    for input in cases {
        assert!(Host::parse(input).is_err(), "{input} should be rejected");
    }
}

#[test]
fn test_signed_indexing_and_keys() {
    let host = Host::parse("www.news.bbc.co.uk").unwrap();
    assert_eq!(host.count(), 5);
    assert_eq!(host.labels(), &["uk", "co", "bbc", "news", "www"]);
    assert_eq!(host.label_at(0), Some("uk"));
    assert_eq!(host.label_at(4), Some("www"));
    assert_eq!(host.label_at(-1), Some("www"));
    assert_eq!(host.label_at(-5), Some("uk"));
    assert_eq!(host.label_at(5), None);
    assert_eq!(host.keys("co"), vec![1]);
}

#[test]
fn test_mutations_return_new_values() {
    let host = Host::parse("example.com").unwrap();

    let cases: Vec<(&str, Host)> = vec![
        ("www.example.com", host.prepend("www").unwrap()),
        ("example.com.uk", host.append("uk").unwrap()),
        ("example.org", host.with_label(0, "org").unwrap()),
        ("sample.com", host.with_label(-1, "sample").unwrap()),
    ];
    for (expected, mutated) in cases {
        assert_eq!(mutated.content(), Some(expected));
    }
    // the receiver never changes
    assert_eq!(host.content(), Some("example.com"));

    let trimmed = Host::parse("www.example.com")
        .unwrap()
        .without_label(&[-1])
        .unwrap();
    assert_eq!(trimmed.content(), Some("example.com"));
}

#[test]
fn test_mutation_error_kinds() {
    let host = Host::parse("example.com").unwrap();

    assert!(matches!(
        host.with_label(9, "www").unwrap_err(),
        Error::InvalidLabelKey { key: 9, count: 2 }
    ));
    assert!(matches!(
        host.with_label(0, "").unwrap_err(),
        Error::InvalidLabel { .. }
    ));
    assert!(matches!(
        host.with_label(0, "bad..label").unwrap_err(),
        Error::InvalidLabel { .. }
    ));
    // the substituted result must itself be a valid host
    assert!(host.with_label(0, "123").is_err());
}

#[test]
fn test_ascii_unicode_round_trip_property() {
    let cases = vec![
        "example.com",
        "bébé.be",
        "www.食狮.公司.cn",
        "xn--bcher-kva.de",
        "faß.de",
    ];
    for input in cases {
        let host = Host::parse(input).unwrap();
        let there = host.to_ascii().unwrap().to_unicode().unwrap();
        let direct = host.to_unicode().unwrap();
        assert_eq!(
            there.content(),
            direct.content(),
            "ASCII/Unicode round trip must agree for {input}"
        );
    }
}

#[test]
fn test_to_ascii_is_identity_on_ascii_content() {
    for input in ["example.com", "xn--bcher-kva.de", "a-b.c--d.net"] {
        let host = Host::parse(input).unwrap();
        assert_eq!(host.to_ascii().unwrap(), host, "to_ascii must not touch {input}");
    }
}

#[test]
fn test_option_mutators_are_identity_for_current_values() {
    let host = Host::parse("example.com").unwrap();
    assert_eq!(
        host.with_ascii_idna_option(host.ascii_options()).unwrap(),
        host
    );
    assert_eq!(
        host.with_unicode_idna_option(host.unicode_options()).unwrap(),
        host
    );
}

#[test]
fn test_suffix_from_bare_string() {
    let suffix = Suffix::parse("co.uk").unwrap();
    assert_eq!(suffix.section(), Section::Unknown);
    assert_eq!(suffix.labels(), &["uk", "co"]);
    assert!(!suffix.is_known());
}
