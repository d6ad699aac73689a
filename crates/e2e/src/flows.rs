//! Known screens of the payment admin console
//!
//! Titles are the exact texts the console renders after each action;
//! every check against a screen is built from these instead of
//! re-declaring the list at the call site.

use regex::Regex;

use crate::config::OracleConfig;
use crate::error::E2eResult;
use crate::expectation::{HeadingMatcher, TransitionExpectation};

pub const PROVIDER_LIST_TITLE: &str = "Payment Provider List";
pub const MERCHANT_LIST_TITLE: &str = "Payment Merchant List";
pub const DICTIONARY_LIST_TITLE: &str = "Payment Dictionary List";

/// Pages and dialogs reachable from the provider list
pub const PROVIDER_FLOW_TITLES: &[&str] = &[
    "Edit Payment Provider",
    "Edit Payment Provider External Connections",
    "Edit Payment Provider Accounts",
    "Edit Payment Provider Service Identifiers",
    "Edit Payment Provider Certificate",
    "Edit Payment Provider Currencies",
    "Add provider certificate",
    "Provider details",
    "Create Payment Provider",
];

/// Pages and dialogs reachable from the merchant list
pub const MERCHANT_FLOW_TITLES: &[&str] = &[
    "Create Payment Merchant",
    "Merchant details",
    "Add merchant certificate",
    "Edit Payment Merchant",
    "Edit Payment Merchant External Connections",
    "Edit Payment Merchant Service Identifiers",
    "Edit Payment Merchant Certificate",
];

pub const DICTIONARY_CREATE_TITLE: &str = "Create Payment Dictionary Items";
pub const DICTIONARY_EDIT_TITLE: &str = "Edit Payment Dictionary Items";
pub const DICTIONARY_DELETE_TITLE: &str = "Delete Payment Dictionary Items";

pub const PROVIDER_LIST_ROUTE: &str = r".*/payment/provider/list.*";
pub const MERCHANT_LIST_ROUTE: &str = r".*/payment/merchant/list.*";
pub const DICTIONARY_LIST_ROUTE: &str = r".*/payment/dictionary/list.*";
pub const DICTIONARY_EDIT_ROUTE: &str = r".*/payment/dictionary/edit.*";

/// Admin screens that tests drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    ProviderList,
    MerchantList,
    DictionaryList,
    DictionaryEdit,
}

impl Screen {
    pub fn route(self) -> &'static str {
        match self {
            Screen::ProviderList => PROVIDER_LIST_ROUTE,
            Screen::MerchantList => MERCHANT_LIST_ROUTE,
            Screen::DictionaryList => DICTIONARY_LIST_ROUTE,
            Screen::DictionaryEdit => DICTIONARY_EDIT_ROUTE,
        }
    }

    pub fn route_regex(self) -> E2eResult<Regex> {
        Ok(Regex::new(self.route())?)
    }

    /// Arrive on this screen (menu navigation, save-and-return)
    pub fn arrival(self, config: &OracleConfig) -> E2eResult<TransitionExpectation> {
        Ok(TransitionExpectation::default()
            .or_route(self.route_regex()?)
            .with_config(config))
    }
}

/// Any flow opened from a provider row or the provider Create button
pub fn provider_flow(config: &OracleConfig) -> TransitionExpectation {
    TransitionExpectation::navigation_or_titles(PROVIDER_FLOW_TITLES.iter().copied())
        .with_config(config)
}

/// Any flow opened from a merchant row or the merchant Create button
pub fn merchant_flow(config: &OracleConfig) -> TransitionExpectation {
    TransitionExpectation::navigation_or_titles(MERCHANT_FLOW_TITLES.iter().copied())
        .with_config(config)
}

/// The dictionary Create button
pub fn dictionary_create(config: &OracleConfig) -> TransitionExpectation {
    TransitionExpectation::navigation_or_titles([DICTIONARY_CREATE_TITLE]).with_config(config)
}

/// "Edit Selected" on the dictionary list
pub fn dictionary_edit(config: &OracleConfig) -> TransitionExpectation {
    TransitionExpectation::navigation_or_titles([DICTIONARY_EDIT_TITLE]).with_config(config)
}

/// "Delete Selected" on the dictionary list
pub fn dictionary_delete(config: &OracleConfig) -> TransitionExpectation {
    TransitionExpectation::navigation_or_titles([DICTIONARY_DELETE_TITLE]).with_config(config)
}

/// A single exact title, with no location shortcut
pub fn exact_title(title: &str, config: &OracleConfig) -> TransitionExpectation {
    TransitionExpectation::heading(HeadingMatcher::exact(title)).with_config(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Screen::ProviderList, "https://admin.test/payment/provider/list")]
    #[test_case(Screen::MerchantList, "https://admin.test/payment/merchant/list?page=1")]
    #[test_case(Screen::DictionaryList, "https://admin.test/payment/dictionary/list")]
    #[test_case(Screen::DictionaryEdit, "https://admin.test/payment/dictionary/edit/42")]
    fn arrival_accepts_route(screen: Screen, url: &str) {
        let exp = screen.arrival(&OracleConfig::default()).unwrap();
        assert!(exp.accepts_location(url, url));
        assert!(!exp.accepts_location("https://admin.test/home", "https://admin.test/home"));
    }

    #[test]
    fn provider_and_merchant_titles_do_not_cross() {
        let config = OracleConfig::default();
        let provider = provider_flow(&config);
        let merchant = merchant_flow(&config);

        assert!(provider.accepts_heading("Create Payment Provider"));
        assert!(!provider.accepts_heading("Create Payment Merchant"));
        assert!(merchant.accepts_heading("Create Payment Merchant"));
        assert!(!merchant.accepts_heading("Edit Payment Provider"));

        assert!(provider.accepts_heading("Provider details"));
        assert!(!provider.accepts_heading("Merchant details"));
        assert!(merchant.accepts_heading("Merchant details"));
        assert!(merchant.accepts_heading("Add merchant certificate"));
        assert!(!merchant.accepts_heading("Add provider certificate"));
        assert!(!merchant.accepts_heading("Create Payment MerchantMerchant details"));
    }

    #[test]
    fn dictionary_edit_and_delete_titles() {
        let config = OracleConfig::default();
        assert!(dictionary_edit(&config).accepts_heading("Edit Payment Dictionary Items"));
        assert!(!dictionary_edit(&config).accepts_heading("Delete Payment Dictionary Items"));
        assert!(dictionary_delete(&config).accepts_heading("Delete Payment Dictionary Items"));
        assert!(!dictionary_delete(&config).accepts_heading("Edit Payment Dictionary Items"));
    }

    #[test]
    fn exact_title_uses_config_timing() {
        let config = OracleConfig {
            timeout_ms: 1234,
            poll_interval_ms: 50,
        };
        let exp = exact_title(DICTIONARY_CREATE_TITLE, &config);
        assert!(exp.requires_heading());
        assert_eq!(exp.timeout.as_millis(), 1234);
        assert_eq!(exp.poll_interval.as_millis(), 50);
    }
}
