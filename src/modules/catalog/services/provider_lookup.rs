/// Mobile operators keyed by the first four digits of a local number
const PREFIXES: &[(&str, &[&str])] = &[
    ("AS", &["0852", "0853", "0823", "0851"]),
    ("Halo", &["0811"]),
    ("Telkomsel", &["0812", "0813", "0821", "0822"]),
    (
        "Indosat",
        &["0814", "0815", "0816", "0855", "0856", "0857", "0858"],
    ),
    ("XL", &["0817", "0818", "0859", "0877", "0878"]),
    ("Axis", &["0838", "0831", "0832", "0833"]),
    ("Three", &["0895", "0896", "0897", "0898", "0899"]),
    (
        "Smartfren",
        &["0881", "0882", "0883", "0884", "0885", "0886", "0887", "0888"],
    ),
];

/// Operator name for a phone number, `None` when the prefix is unknown
pub fn provider_for_phone(phone_number: &str) -> Option<&'static str> {
    let prefix = phone_number.trim().get(..4)?;

    PREFIXES
        .iter()
        .find(|(_, prefixes)| prefixes.contains(&prefix))
        .map(|(provider, _)| *provider)
}
