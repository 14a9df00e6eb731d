#![forbid(unsafe_code)]

use std::sync::Arc;

use async_trait::async_trait;
use beacons_kernel_contracts::{Redirect, SessionContext, SubmissionId};
use beacons_os::pages::{self, registration_pages};
use beacons_os::{
    PageOutcome, PageRequest, RegistrationApi, RegistrationApiError, SubmitRegistration,
};
use beacons_storage::{FormCache, FormCacheConfig, InMemoryFormCache};

struct AcceptingApi;

#[async_trait]
impl RegistrationApi for AcceptingApi {
    async fn post(
        &self,
        _path: &str,
        body: serde_json::Value,
    ) -> Result<bool, RegistrationApiError> {
        Ok(body.get("hexId").is_some())
    }
}

fn session() -> SessionContext {
    SessionContext::v1(SubmissionId::new("wizard-1").unwrap(), false)
}

#[tokio::test]
async fn at_wizard_flow_01_full_registration_walk() {
    let cache: Arc<dyn FormCache> =
        Arc::new(InMemoryFormCache::new(FormCacheConfig::mvp_v1()).unwrap());
    let bodies = [
        "manufacturer=ACME&model=Excelsior&hexId=1D0EA08C52FFBFF",
        "manufacturerSerialNumber=SN-1&batteryExpiryDateYear=2030&batteryExpiryDateMonth=4",
        "beaconOwnerFullName=A+Person&beaconOwnerEmail=a%40example.com",
        "beaconOwnerAddressLine1=1+Harbour+Way&beaconOwnerTownOrCity=Poole&beaconOwnerPostcode=BH15+1AA",
    ];

    for (page, body) in registration_pages().iter().zip(bodies) {
        let handler = page.handler(cache.clone());
        let outcome = handler
            .handle(PageRequest::post(session(), body))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PageOutcome::Redirect(Redirect::see_other(page.next)),
            "{}",
            page.path
        );
    }

    let answers = pages::check_your_answers(cache.as_ref(), &session())
        .await
        .unwrap();
    assert_eq!(answers.registration.get("hexId"), Some("1D0EA08C52FFBFF"));
    assert_eq!(
        answers.registration.get("batteryExpiryDate"),
        Some("2030-04-01")
    );
    assert_eq!(answers.registration.get("beaconOwnerPostcode"), Some("BH15 1AA"));

    let outcome = SubmitRegistration::new(cache.clone(), Arc::new(AcceptingApi))
        .run(&session())
        .await
        .unwrap();
    assert!(outcome.props.registration_success);
    assert!(cache.get(&session().submission_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn at_wizard_flow_02_invalid_page_keeps_partial_input_for_reload() {
    let cache: Arc<dyn FormCache> =
        Arc::new(InMemoryFormCache::new(FormCacheConfig::mvp_v1()).unwrap());
    let page = &registration_pages()[0];
    let handler = page.handler(cache.clone());

    let outcome = handler
        .handle(PageRequest::post(session(), "manufacturer=ACME&hexId=1D0"))
        .await
        .unwrap();
    let props = outcome.as_props().unwrap();
    let hrefs: Vec<&str> = props
        .form
        .error_summary
        .iter()
        .map(|item| item.href.as_str())
        .collect();
    assert_eq!(hrefs, vec!["#model", "#hexId"]);

    let reload = handler.handle(PageRequest::get(session())).await.unwrap();
    let props = reload.as_props().unwrap();
    assert_eq!(props.form.fields["manufacturer"].value, "ACME");
    assert_eq!(props.form.fields["hexId"].value, "1D0");
    assert!(props.form.error_summary.is_empty());
}
