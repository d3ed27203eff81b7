//! Rendering of storefront routes into a flat list of addressable elements.
//!
//! Selectors are matched literally against each element's selector list.
//! `:has-text()` selectors ignore case, and `text=` selectors compare the
//! text of interactive elements case-insensitively.

use crate::catalog::{Field, Store, PRODUCTS};
use crate::MarkupVersion;

pub const ABOUT_URL: &str = "https://saucelabs.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Inventory,
    Item(usize),
    Cart,
    CheckoutInfo,
    CheckoutOverview,
    CheckoutComplete,
    External(String),
}

impl Route {
    pub fn parse(url: &str, root: &str) -> Route {
        let Some(rest) = url.strip_prefix(root) else {
            return Route::External(url.to_string());
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        match path {
            "" | "index.html" => Route::Login,
            "inventory.html" => Route::Inventory,
            "inventory-item.html" => {
                let id = query
                    .and_then(|q| q.strip_prefix("id="))
                    .and_then(|id| id.parse::<usize>().ok())
                    .filter(|id| *id < PRODUCTS.len())
                    .unwrap_or(0);
                Route::Item(id)
            }
            "cart.html" => Route::Cart,
            "checkout-step-one.html" => Route::CheckoutInfo,
            "checkout-step-two.html" => Route::CheckoutOverview,
            "checkout-complete.html" => Route::CheckoutComplete,
            _ => Route::External(url.to_string()),
        }
    }

    pub fn url(&self, root: &str) -> String {
        match self {
            Route::Login => format!("{}index.html", root),
            Route::Inventory => format!("{}inventory.html", root),
            Route::Item(id) => format!("{}inventory-item.html?id={}", root, id),
            Route::Cart => format!("{}cart.html", root),
            Route::CheckoutInfo => format!("{}checkout-step-one.html", root),
            Route::CheckoutOverview => format!("{}checkout-step-two.html", root),
            Route::CheckoutComplete => format!("{}checkout-complete.html", root),
            Route::External(url) => url.clone(),
        }
    }

    pub fn requires_login(&self) -> bool {
        !matches!(self, Route::Login | Route::External(_))
    }
}

/// What activating an element does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Static,
    Input(Field),
    SortSelect,
    Login,
    DismissError,
    AddToCart(usize),
    RemoveFromCart(usize),
    OpenItem(usize),
    BackToProducts,
    OpenCart,
    ContinueShopping,
    Checkout,
    ContinueCheckout,
    CancelCheckout,
    Finish,
    OpenMenu,
    CloseMenu,
    AllItems,
    About,
    Logout,
    ResetApp,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub selectors: Vec<String>,
    pub text: String,
    pub behavior: Behavior,
    pub visible: bool,
}

impl Element {
    fn new(selectors: &[&str], text: impl Into<String>, behavior: Behavior) -> Self {
        Self {
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            text: text.into(),
            behavior,
            visible: true,
        }
    }

    fn label(selectors: &[&str], text: impl Into<String>) -> Self {
        Self::new(selectors, text, Behavior::Static)
    }

    /// A control that is also addressable by its visible label.
    fn control(tag: &str, selectors: &[&str], text: &str, behavior: Behavior) -> Self {
        let mut element = Self::new(selectors, text, behavior);
        element
            .selectors
            .push(format!("{}:has-text(\"{}\")", tag, text));
        element.selectors.push(format!("{}:contains({})", tag, text));
        element
    }

    fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn matches(&self, selector: &str) -> bool {
        let fold_case = selector.contains(":has-text(");
        if self
            .selectors
            .iter()
            .any(|s| s == selector || (fold_case && s.eq_ignore_ascii_case(selector)))
        {
            return true;
        }
        match selector.strip_prefix("text=") {
            Some(text) => {
                self.behavior != Behavior::Static && self.text.eq_ignore_ascii_case(text.trim())
            }
            None => false,
        }
    }
}

fn cart_button(id: usize, in_cart: bool, scope: &str) -> Element {
    if in_cart {
        Element::control(
            "button",
            &[scope, ".btn_inventory", ".btn_secondary"],
            "REMOVE",
            Behavior::RemoveFromCart(id),
        )
    } else {
        Element::control(
            "button",
            &[scope, ".btn_inventory", ".btn_primary"],
            "ADD TO CART",
            Behavior::AddToCart(id),
        )
    }
}

fn header(store: &Store, out: &mut Vec<Element>) {
    out.push(Element::new(
        &[".shopping_cart_link", "a.shopping_cart_link", "#shopping_cart_container a"],
        "",
        Behavior::OpenCart,
    ));
    if !store.cart.is_empty() {
        out.push(Element::label(
            &[".shopping_cart_badge"],
            store.cart.len().to_string(),
        ));
    }
    out.push(Element::control(
        "button",
        &[".bm-burger-button", ".bm-burger-button button"],
        "Open Menu",
        Behavior::OpenMenu,
    ));

    let menu: Vec<Element> = vec![
        Element::label(&[".bm-menu", ".bm-menu-wrap"], ""),
        Element::control(
            "a",
            &["#inventory_sidebar_link"],
            "All Items",
            Behavior::AllItems,
        ),
        Element::control("a", &["#about_sidebar_link"], "About", Behavior::About),
        Element::control("a", &["#logout_sidebar_link"], "Logout", Behavior::Logout),
        Element::control(
            "a",
            &["#reset_sidebar_link"],
            "Reset App State",
            Behavior::ResetApp,
        ),
        Element::control(
            "button",
            &[".bm-cross-button", ".bm-cross-button button"],
            "Close Menu",
            Behavior::CloseMenu,
        ),
    ];
    for element in menu {
        out.push(if store.menu_open {
            element
        } else {
            element.hidden()
        });
    }
}

fn error_banner(message: &Option<String>, out: &mut Vec<Element>) {
    if let Some(message) = message {
        out.push(Element::label(&["[data-test=\"error\"]", "h3[data-test=\"error\"]"], message.clone()));
        out.push(Element::new(&[".error-button"], "", Behavior::DismissError));
    }
}

fn cart_items(store: &Store, removable: bool, out: &mut Vec<Element>) {
    for id in &store.cart {
        let product = &PRODUCTS[*id];
        out.push(Element::label(&[".cart_item"], product.name));
        out.push(Element::label(&[".inventory_item_name"], product.name));
        out.push(Element::label(&[".inventory_item_price"], product.price_label()));
        if removable {
            out.push(Element::control(
                "button",
                &[".cart_button", ".cart_item button"],
                "REMOVE",
                Behavior::RemoveFromCart(*id),
            ));
        }
    }
}

/// Render `route` for the given session state.
pub fn render(route: &Route, store: &Store, markup: MarkupVersion) -> Vec<Element> {
    let mut out = Vec::new();
    match route {
        Route::Login => {
            out.push(Element::label(&[".login_logo"], "Swag Labs"));
            out.push(Element::new(
                &["#user-name", "[data-test=\"username\"]"],
                store.username.clone(),
                Behavior::Input(Field::Username),
            ));
            out.push(Element::new(
                &["#password", "[data-test=\"password\"]"],
                store.password.clone(),
                Behavior::Input(Field::Password),
            ));
            out.push(Element::new(
                &["#login-button", "input[value=\"LOGIN\"]", "[data-test=\"login-button\"]"],
                "LOGIN",
                Behavior::Login,
            ));
            error_banner(&store.login_error, &mut out);
        }
        Route::Inventory => {
            header(store, &mut out);
            out.push(Element::label(&[".inventory_list"], ""));
            out.push(Element::new(
                &[".product_sort_container", "select.product_sort_container"],
                "",
                Behavior::SortSelect,
            ));
            for id in store.listing() {
                let product = &PRODUCTS[id];
                out.push(Element::label(&[".inventory_item"], product.name));
                out.push(Element::label(&[".inventory_item_img"], ""));
                out.push(Element::new(
                    &[".inventory_item_name"],
                    product.name,
                    Behavior::OpenItem(id),
                ));
                out.push(Element::label(&[".inventory_item_desc"], product.description));
                out.push(Element::label(&[".inventory_item_price"], product.price_label()));
                out.push(cart_button(id, store.in_cart(id), ".inventory_item button"));
            }
        }
        Route::Item(id) => {
            header(store, &mut out);
            let product = &PRODUCTS[*id];
            out.push(Element::label(&[".inventory_details_name"], product.name));
            out.push(Element::label(&[".inventory_details_desc"], product.description));
            out.push(Element::label(&[".inventory_details_price"], product.price_label()));
            out.push(cart_button(*id, store.in_cart(*id), ".inventory_details button"));
            out.push(Element::control(
                "button",
                &[".inventory_details_back_button"],
                "<- Back",
                Behavior::BackToProducts,
            ));
        }
        Route::Cart => {
            header(store, &mut out);
            out.push(Element::label(&[".cart_list"], ""));
            cart_items(store, true, &mut out);
            out.push(Element::control(
                "a",
                &[".btn_secondary", "#continue-shopping"],
                "Continue Shopping",
                Behavior::ContinueShopping,
            ));
            out.push(match markup {
                MarkupVersion::V1 => Element::control(
                    "a",
                    &[".checkout_button", "a.checkout_button"],
                    "CHECKOUT",
                    Behavior::Checkout,
                ),
                MarkupVersion::V2 => Element::control(
                    "button",
                    &["button[data-test=\"checkout\"]", "button#checkout", "#checkout"],
                    "Checkout",
                    Behavior::Checkout,
                ),
            });
        }
        Route::CheckoutInfo => {
            header(store, &mut out);
            out.push(Element::new(
                &["[data-test=\"firstName\"]", "#first-name"],
                store.first_name.clone(),
                Behavior::Input(Field::FirstName),
            ));
            out.push(Element::new(
                &["[data-test=\"lastName\"]", "#last-name"],
                store.last_name.clone(),
                Behavior::Input(Field::LastName),
            ));
            out.push(Element::new(
                &["[data-test=\"postalCode\"]", "#postal-code"],
                store.postal_code.clone(),
                Behavior::Input(Field::PostalCode),
            ));
            out.push(match markup {
                MarkupVersion::V1 => Element::new(
                    &["input[value=\"CONTINUE\"]", ".cart_button", "[data-test=\"continue\"]"],
                    "CONTINUE",
                    Behavior::ContinueCheckout,
                ),
                MarkupVersion::V2 => Element::control(
                    "button",
                    &["button[data-test=\"continue\"]", "button#continue", "[data-test=\"continue\"]"],
                    "Continue",
                    Behavior::ContinueCheckout,
                ),
            });
            out.push(Element::control(
                "a",
                &["[data-test=\"cancel\"]", ".cart_cancel_link"],
                "CANCEL",
                Behavior::CancelCheckout,
            ));
            error_banner(&store.checkout_error, &mut out);
        }
        Route::CheckoutOverview => {
            header(store, &mut out);
            cart_items(store, false, &mut out);
            let subtotal = store.subtotal_cents();
            let tax = subtotal * 8 / 100;
            out.push(Element::label(&[".summary_info"], ""));
            out.push(Element::label(
                &[".summary_subtotal_label"],
                format!("Item total: ${}.{:02}", subtotal / 100, subtotal % 100),
            ));
            out.push(Element::label(
                &[".summary_tax_label"],
                format!("Tax: ${}.{:02}", tax / 100, tax % 100),
            ));
            let total = subtotal + tax;
            out.push(Element::label(
                &[".summary_total_label"],
                format!("Total: ${}.{:02}", total / 100, total % 100),
            ));
            out.push(match markup {
                MarkupVersion::V1 => Element::control(
                    "a",
                    &[".cart_button", "a.cart_button", "[data-test=\"finish\"]"],
                    "FINISH",
                    Behavior::Finish,
                ),
                MarkupVersion::V2 => Element::control(
                    "button",
                    &["button[data-test=\"finish\"]", "button#finish", "[data-test=\"finish\"]"],
                    "Finish",
                    Behavior::Finish,
                ),
            });
            out.push(Element::control(
                "a",
                &["[data-test=\"cancel\"]", ".cart_cancel_link"],
                "CANCEL",
                Behavior::ContinueShopping,
            ));
        }
        Route::CheckoutComplete => {
            header(store, &mut out);
            out.push(Element::label(&[".complete-header"], "THANK YOU FOR YOUR ORDER"));
            out.push(Element::label(
                &[".complete-text"],
                "Your order has been dispatched, and will arrive just as fast as the pony can get there!",
            ));
            out.push(Element::label(&[".pony_express"], ""));
        }
        Route::External(_) => {
            out.push(Element::label(&["h1"], "Sauce Labs"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "https://www.saucedemo.com/v1/";

    #[test]
    fn parses_routes_relative_to_root() {
        assert_eq!(Route::parse("https://www.saucedemo.com/v1/index.html", ROOT), Route::Login);
        assert_eq!(Route::parse("https://www.saucedemo.com/v1/", ROOT), Route::Login);
        assert_eq!(
            Route::parse("https://www.saucedemo.com/v1/inventory-item.html?id=4", ROOT),
            Route::Item(4)
        );
        assert_eq!(
            Route::parse(ABOUT_URL, ROOT),
            Route::External(ABOUT_URL.to_string())
        );
    }

    #[test]
    fn route_url_round_trips_through_parse() {
        let route = Route::CheckoutOverview;
        assert_eq!(Route::parse(&route.url(ROOT), ROOT), route);
    }

    #[test]
    fn text_selector_ignores_case_but_skips_labels() {
        let store = Store {
            cart: vec![0],
            ..Store::default()
        };
        let elements = render(&Route::Cart, &store, MarkupVersion::V1);
        assert!(elements.iter().any(|e| e.matches("text=Checkout")));
        assert!(elements.iter().any(|e| e.matches("a:has-text(\"CHECKOUT\")")));
        assert!(elements.iter().any(|e| e.matches("a:has-text(\"Checkout\")")));
        assert!(!elements.iter().any(|e| e.matches("button#checkout")));
    }

    #[test]
    fn v2_cart_exposes_button_checkout_control() {
        let elements = render(&Route::Cart, &Store::default(), MarkupVersion::V2);
        assert!(elements.iter().any(|e| e.matches("button:contains(Checkout)")));
        assert!(!elements.iter().any(|e| e.matches("#checkout-button")));
    }

    #[test]
    fn menu_entries_hidden_until_opened() {
        let mut store = Store::default();
        let closed = render(&Route::Inventory, &store, MarkupVersion::V1);
        let logout = closed
            .iter()
            .find(|e| e.matches("#logout_sidebar_link"))
            .unwrap();
        assert!(!logout.visible);

        store.menu_open = true;
        let open = render(&Route::Inventory, &store, MarkupVersion::V1);
        assert!(open
            .iter()
            .find(|e| e.matches("#logout_sidebar_link"))
            .unwrap()
            .visible);
    }
}
