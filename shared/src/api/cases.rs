use serde::Deserialize;

use super::Gateway;
use crate::capabilities::{read_json, read_ok};
use crate::cases::NewCase;
use crate::error::ApiError;
use crate::event::Event;
use crate::model::CaseRecord;

/// The case list comes back either bare or wrapped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CaseListResponse {
    Bare(Vec<CaseRecord>),
    Wrapped { cases: Vec<CaseRecord> },
}

impl CaseListResponse {
    #[must_use]
    pub fn into_cases(self) -> Vec<CaseRecord> {
        match self {
            Self::Bare(cases) | Self::Wrapped { cases } => cases,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CaseDetailResponse {
    Wrapped { case: CaseRecord },
    Bare(CaseRecord),
}

impl CaseDetailResponse {
    #[must_use]
    pub fn into_case(self) -> CaseRecord {
        match self {
            Self::Bare(case) | Self::Wrapped { case } => case,
        }
    }
}

impl Gateway<'_> {
    pub fn create_case(&self, case: &NewCase) -> Result<(), ApiError> {
        let url = self.endpoints.api.endpoint(&["api", "cases"]);
        self.post_json(&url, case)?
            .send(|result| Event::CaseCreated(read_ok(result)));
        Ok(())
    }

    pub fn list_cases(&self) {
        let url = self.endpoints.api.endpoint(&["api", "cases"]);
        self.get(&url).send(|result| {
            Event::CasesLoaded(read_json::<CaseListResponse>(result).map(CaseListResponse::into_cases))
        });
    }

    pub fn get_case(&self, id: &str) {
        let url = self.endpoints.api.endpoint(&["api", "cases", id]);
        let case_id = id.to_string();
        self.get(&url).send(move |result| Event::CaseLoaded {
            case_id,
            result: read_json::<CaseDetailResponse>(result).map(CaseDetailResponse::into_case),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_accepts_both_shapes() {
        let bare: CaseListResponse =
            serde_json::from_str(r#"[{"id": "c1", "name": "Estate of Brown"}]"#).unwrap();
        assert_eq!(bare.into_cases().len(), 1);

        let wrapped: CaseListResponse = serde_json::from_str(
            r#"{"cases": [{"_id": "c1", "case_name": "Estate of Brown"}, {"id": "c2", "name": "Smith v. Davidson"}]}"#,
        )
        .unwrap();
        let cases = wrapped.into_cases();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].id, "c1");
    }

    #[test]
    fn test_detail_accepts_both_shapes() {
        let bare: CaseDetailResponse =
            serde_json::from_str(r#"{"id": "c1", "name": "Estate of Brown"}"#).unwrap();
        assert_eq!(bare.into_case().name, "Estate of Brown");

        let wrapped: CaseDetailResponse =
            serde_json::from_str(r#"{"case": {"id": "c1", "name": "Estate of Brown"}}"#).unwrap();
        assert_eq!(wrapped.into_case().id, "c1");
    }
}
