// ============================================================================
// INVOICE SEARCH SERVICE - Validación + consulta
// ============================================================================

use tracing::{info, warn};

use crate::error::{InvoiceError, Result};
use crate::models::{Invoice, InvoiceCriteria, SearchParams};
use crate::pagination::{paginate, Page, PageRequest};
use crate::repository::InvoiceRepository;
use crate::services::validation::InvoiceSearchValidator;

/// Entry point for the request layer: raw parameters in, invoices out.
/// Invalid parameters never reach the repository.
#[derive(Clone)]
pub struct InvoiceSearchService {
    repository: InvoiceRepository,
    validator: InvoiceSearchValidator,
}

impl InvoiceSearchService {
    pub fn new(repository: InvoiceRepository) -> Self {
        Self {
            repository,
            validator: InvoiceSearchValidator::new(),
        }
    }

    pub fn repository(&self) -> &InvoiceRepository {
        &self.repository
    }

    /// Typed criteria for `params`, or every validation message at once.
    pub fn validated_criteria(&self, params: &SearchParams) -> Result<InvoiceCriteria> {
        let errors = self.validator.validate(params);
        if !errors.is_empty() {
            warn!(?errors, "Rejected invoice search parameters");
            return Err(InvoiceError::validation(errors));
        }
        Ok(InvoiceCriteria::from(params))
    }

    pub async fn search(&self, params: &SearchParams) -> Result<Vec<Invoice>> {
        let criteria = self.validated_criteria(params)?;
        self.search_criteria(&criteria).await
    }

    pub async fn search_criteria(&self, criteria: &InvoiceCriteria) -> Result<Vec<Invoice>> {
        let errors = self.validator.validate_criteria(criteria);
        if !errors.is_empty() {
            return Err(InvoiceError::validation(errors));
        }
        Ok(self.repository.search(criteria).await?)
    }

    pub async fn paginated_search(&self, params: &SearchParams) -> Result<Page<Invoice>> {
        let criteria = self.validated_criteria(params)?;
        let request = PageRequest::from_params(params);
        let page = paginate(&self.repository, &criteria, request).await?;

        info!(
            page = page.meta.current_page,
            per_page = page.meta.per_page,
            total_count = page.meta.total_count,
            "📄 Paginated invoice search"
        );
        Ok(page)
    }

    pub async fn count_matching(&self, params: &SearchParams) -> Result<i64> {
        let criteria = self.validated_criteria(params)?;
        Ok(self.repository.count_matching(&criteria).await?)
    }

    /// `Ok(None)` when no invoice carries that number.
    pub async fn find_by_number(&self, number: &str) -> Result<Option<Invoice>> {
        Ok(self.repository.find_by_number(number).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheStore;
    use crate::services::validation::{INVALID_ACTIVE_VALUE, INVALID_DATE_FORMAT};
    use crate::store::InMemoryInvoiceStore;
    use std::sync::Arc;

    fn service() -> InvoiceSearchService {
        let store = Arc::new(InMemoryInvoiceStore::new(Vec::new()));
        InvoiceSearchService::new(InvoiceRepository::new(store, Arc::new(InMemoryCacheStore::new())))
    }

    #[tokio::test]
    async fn test_all_validation_messages_are_returned() {
        let params = SearchParams::from_pairs([("date_from", "yesterday"), ("active", "maybe")]);
        let err = service().search(&params).await.unwrap_err();
        assert_eq!(
            err.validation_errors(),
            Some(&[INVALID_DATE_FORMAT.to_string(), INVALID_ACTIVE_VALUE.to_string()][..])
        );
    }

    #[tokio::test]
    async fn test_code_built_criteria_are_checked_too() {
        let criteria = InvoiceCriteria::new()
            .with_min_amount(rust_decimal::Decimal::new(10, 0))
            .with_max_amount(rust_decimal::Decimal::new(1, 0));
        assert!(matches!(
            service().search_criteria(&criteria).await,
            Err(InvoiceError::Validation { .. })
        ));
    }
}
