//! Products, accounts and the shopping state of one simulated session.

use serde::{Deserialize, Serialize};

pub const LOCKED_OUT_USER: &str = "locked_out_user";
pub const STANDARD_USER: &str = "standard_user";
pub const PROBLEM_USER: &str = "problem_user";
pub const PERFORMANCE_GLITCH_USER: &str = "performance_glitch_user";

#[derive(Debug, Clone, Copy)]
pub struct Product {
    pub name: &'static str,
    pub price_cents: u32,
    pub description: &'static str,
}

impl Product {
    pub fn price_label(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

/// Catalog in its default (name ascending) listing order.
pub const PRODUCTS: [Product; 6] = [
    Product {
        name: "Sauce Labs Backpack",
        price_cents: 2999,
        description: "Streamlined sly pack with unequaled laptop and tablet protection.",
    },
    Product {
        name: "Sauce Labs Bike Light",
        price_cents: 999,
        description: "A red light isn't the desired state in testing but it sure helps when riding.",
    },
    Product {
        name: "Sauce Labs Bolt T-Shirt",
        price_cents: 1599,
        description: "Get your testing superhero on with the Sauce Labs bolt T-shirt.",
    },
    Product {
        name: "Sauce Labs Fleece Jacket",
        price_cents: 4999,
        description: "A midweight quarter-zip fleece jacket for the office or the lab.",
    },
    Product {
        name: "Sauce Labs Onesie",
        price_cents: 799,
        description: "Rib snap infant onesie for the junior automation engineer.",
    },
    Product {
        name: "Test.allTheThings() T-Shirt (Red)",
        price_cents: 1599,
        description: "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard.",
    },
];

/// Accounts that can complete a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Account {
    Standard,
    Problem,
    PerformanceGlitch,
}

impl Account {
    fn from_username(username: &str) -> Option<Self> {
        match username {
            STANDARD_USER => Some(Account::Standard),
            PROBLEM_USER => Some(Account::Problem),
            PERFORMANCE_GLITCH_USER => Some(Account::PerformanceGlitch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    pub fn from_option(value: &str) -> Option<Self> {
        match value {
            "az" => Some(SortKey::NameAsc),
            "za" => Some(SortKey::NameDesc),
            "lohi" => Some(SortKey::PriceAsc),
            "hilo" => Some(SortKey::PriceDesc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
    FirstName,
    LastName,
    PostalCode,
}

/// Mutable storefront state shared by every page of one session.
#[derive(Debug, Default)]
pub struct Store {
    pub account: Option<Account>,
    pub username: String,
    pub password: String,
    pub login_error: Option<String>,
    pub cart: Vec<usize>,
    pub sort: SortKey,
    pub menu_open: bool,
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
    pub checkout_error: Option<String>,
}

impl Store {
    /// Validate the typed credentials; on success the account is signed in.
    pub fn attempt_login(&mut self, expected_password: &str) -> Result<Account, String> {
        self.login_error = None;
        let outcome = if self.username.is_empty() {
            Err("Epic sadface: Username is required".to_string())
        } else if self.password.is_empty() {
            Err("Epic sadface: Password is required".to_string())
        } else if self.username == LOCKED_OUT_USER && self.password == expected_password {
            Err("Epic sadface: Sorry, this user has been locked out.".to_string())
        } else {
            match Account::from_username(&self.username) {
                Some(account) if self.password == expected_password => Ok(account),
                _ => Err(
                    "Epic sadface: Username and password do not match any user in this service"
                        .to_string(),
                ),
            }
        };

        match &outcome {
            Ok(account) => self.account = Some(*account),
            Err(message) => self.login_error = Some(message.clone()),
        }
        outcome
    }

    pub fn sign_out(&mut self) {
        self.account = None;
        self.username.clear();
        self.password.clear();
        self.login_error = None;
        self.menu_open = false;
    }

    /// Product indices in the order the inventory page lists them.
    pub fn listing(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = (0..PRODUCTS.len()).collect();
        if self.account == Some(Account::Problem) {
            return ids;
        }
        match self.sort {
            SortKey::NameAsc => ids.sort_by_key(|id| PRODUCTS[*id].name),
            SortKey::NameDesc => ids.sort_by(|a, b| PRODUCTS[*b].name.cmp(PRODUCTS[*a].name)),
            SortKey::PriceAsc => ids.sort_by_key(|id| PRODUCTS[*id].price_cents),
            SortKey::PriceDesc => {
                ids.sort_by(|a, b| PRODUCTS[*b].price_cents.cmp(&PRODUCTS[*a].price_cents))
            }
        }
        ids
    }

    pub fn in_cart(&self, id: usize) -> bool {
        self.cart.contains(&id)
    }

    pub fn field_value(&self, field: Field) -> &str {
        match field {
            Field::Username => &self.username,
            Field::Password => &self.password,
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::PostalCode => &self.postal_code,
        }
    }

    /// Write a form field. The problem account's last-name input writes into
    /// the first-name field instead.
    pub fn set_field(&mut self, field: Field, value: &str) {
        let target = match (field, self.account) {
            (Field::LastName, Some(Account::Problem)) => Field::FirstName,
            (other, _) => other,
        };
        let slot = match target {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::PostalCode => &mut self.postal_code,
        };
        *slot = value.to_string();
    }

    pub fn validate_checkout_info(&mut self) -> bool {
        self.checkout_error = if self.first_name.is_empty() {
            Some("Error: First Name is required".to_string())
        } else if self.last_name.is_empty() {
            Some("Error: Last Name is required".to_string())
        } else if self.postal_code.is_empty() {
            Some("Error: Postal Code is required".to_string())
        } else {
            None
        };
        self.checkout_error.is_none()
    }

    pub fn subtotal_cents(&self) -> u32 {
        self.cart.iter().map(|id| PRODUCTS[*id].price_cents).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(username: &str, password: &str) -> Store {
        let mut store = Store::default();
        store.username = username.to_string();
        store.password = password.to_string();
        store
    }

    #[test]
    fn locked_out_user_is_rejected() {
        let mut store = store_with(LOCKED_OUT_USER, "secret_sauce");
        let err = store.attempt_login("secret_sauce").unwrap_err();
        assert!(err.contains("this user has been locked out"));
        assert!(store.account.is_none());
    }

    #[test]
    fn empty_username_is_reported_first() {
        let mut store = store_with("", "");
        let err = store.attempt_login("secret_sauce").unwrap_err();
        assert!(err.contains("Username is required"));
    }

    #[test]
    fn price_sort_orders_listing() {
        let mut store = store_with(STANDARD_USER, "secret_sauce");
        store.attempt_login("secret_sauce").unwrap();
        store.sort = SortKey::PriceAsc;
        let prices: Vec<u32> = store
            .listing()
            .into_iter()
            .map(|id| PRODUCTS[id].price_cents)
            .collect();
        let mut sorted = prices.clone();
        sorted.sort();
        assert_eq!(prices, sorted);
    }

    #[test]
    fn problem_account_ignores_sort_and_misroutes_last_name() {
        let mut store = store_with(PROBLEM_USER, "secret_sauce");
        store.attempt_login("secret_sauce").unwrap();
        store.sort = SortKey::PriceAsc;
        assert_eq!(store.listing(), vec![0, 1, 2, 3, 4, 5]);

        store.set_field(Field::LastName, "Doe");
        assert_eq!(store.first_name, "Doe");
        assert!(store.last_name.is_empty());
    }

    #[test]
    fn price_label_formats_cents() {
        assert_eq!(PRODUCTS[1].price_label(), "$9.99");
        assert_eq!(PRODUCTS[3].price_label(), "$49.99");
    }
}
