//! Integration tests for the registration wizard and address enrichment.

use std::sync::Arc;

use criadouro_address::{AddressError, LookupTransport, ViaCepClient};
use criadouro_app::resolve_registration_address;
use criadouro_ui::{
    AddressInfo, PersonalInfo, RegistrationForm, RegistrationStep, ValidationError, format_phone,
};
use url::Url;

struct CannedLookup {
    body: Result<String, String>,
}

impl LookupTransport for CannedLookup {
    fn get(&self, _url: &Url) -> Result<String, AddressError> {
        self.body
            .clone()
            .map_err(AddressError::Transport)
    }
}

fn valid_personal() -> PersonalInfo {
    PersonalInfo {
        name: "Ana Souza".to_string(),
        email: "ana@example.com".to_string(),
        password: "secret1".to_string(),
        phone: "(11) 98765-4321".to_string(),
    }
}

#[test]
fn registration_wizard_tests_walks_all_steps() {
    let mut form = RegistrationForm::new();
    form.personal = valid_personal();
    assert_eq!(form.advance(), Ok(RegistrationStep::Address));

    form.address = AddressInfo {
        cep: "01310-100".to_string(),
        street: "Avenida Paulista".to_string(),
        number: "1000".to_string(),
        neighborhood: "Bela Vista".to_string(),
        complement: String::new(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
        coordinates: None,
    };
    assert_eq!(form.advance(), Ok(RegistrationStep::Review));
    assert_eq!(form.advance(), Ok(RegistrationStep::Done));
}

#[test]
fn registration_wizard_tests_short_password_blocks_personal_step() {
    let mut form = RegistrationForm::new();
    form.personal = PersonalInfo {
        password: "12345".to_string(),
        ..valid_personal()
    };
    assert_eq!(form.advance(), Err(ValidationError::PasswordTooShort));
    assert_eq!(form.step(), RegistrationStep::Personal);
}

#[test]
fn registration_wizard_tests_cep_lookup_fills_address_fields() {
    let transport = Arc::new(CannedLookup {
        body: Ok(r#"{"cep":"01310-100","logradouro":"Avenida Paulista",
                     "bairro":"Bela Vista","localidade":"São Paulo","uf":"SP"}"#
            .to_string()),
    });
    let client =
        ViaCepClient::new("https://viacep.com.br/ws", transport).expect("client should build");

    let address =
        resolve_registration_address(&client, "01310-100").expect("address should resolve");
    assert_eq!(address.street, "Avenida Paulista");
    assert_eq!(address.city, "São Paulo");
}

#[test]
fn registration_wizard_tests_lookup_failure_degrades_to_manual_entry() {
    let transport = Arc::new(CannedLookup {
        body: Err("operation timed out".to_string()),
    });
    let client =
        ViaCepClient::new("https://viacep.com.br/ws", transport).expect("client should build");

    assert!(resolve_registration_address(&client, "01310-100").is_none());
}

#[test]
fn registration_wizard_tests_phone_mask() {
    assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
}
