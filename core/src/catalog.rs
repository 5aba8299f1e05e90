//! Built-in gym catalog.
//!
//! Returned by value; callers pass it (or their own list) to
//! `Reconciler::sync_all`.

use serde_json::json;

use crate::types::{Address, BusinessUnit, Reference};

fn boulders_denmark() -> Reference {
    Reference::new(1, "Boulders Denmark")
}

fn gym(
    id: u64,
    name: &str,
    (street, city, postal_code): (&str, &str, &str),
    (latitude, longitude): (f64, f64),
    region: Reference,
) -> BusinessUnit {
    BusinessUnit {
        id,
        name: name.to_string(),
        company: Some(boulders_denmark()),
        company_name_for_invoice: "Boulders Denmark A/S".to_string(),
        address: Some(Address {
            street: street.to_string(),
            city: city.to_string(),
            postal_code: postal_code.to_string(),
            country: "DK".to_string(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }),
        location: "DK".to_string(),
        region: Some(region),
        currency: "DKK".to_string(),
        release_suspension_product: Some(json!({ "id": 1001, "name": "Membership pause" })),
        settings: Some(json!({ "allowOnlineSignup": true })),
        has_register_unit_for_internet: true,
    }
}

pub fn boulders_copenhagen() -> BusinessUnit {
    gym(
        1,
        "Boulders Copenhagen",
        ("Vesterbrogade 149", "København V", "1620"),
        (55.6713, 12.5331),
        Reference::new(1, "Copenhagen Region"),
    )
}

pub fn sample_catalog() -> Vec<BusinessUnit> {
    vec![
        boulders_copenhagen(),
        gym(
            2,
            "Boulders Aarhus",
            ("Søren Frichs Vej 42", "Åbyhøj", "8230"),
            (56.1523, 10.1616),
            Reference::new(2, "Jutland Region"),
        ),
        gym(
            3,
            "Boulders Odense",
            ("Thriges Plads 3", "Odense C", "5000"),
            (55.4016, 10.3871),
            Reference::new(3, "Funen Region"),
        ),
    ]
}
