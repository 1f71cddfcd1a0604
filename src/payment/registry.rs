use super::cod::CashOnDeliveryProvider;
use super::online::OnlineGatewayProvider;
use super::provider::PaymentProvider;
use crate::config::PaymentsConfig;
use crate::domain::PaymentMethod;
use crate::error::PaymentError;
use std::collections::HashMap;
use std::sync::Arc;

/// Payment providers keyed by the method they serve.
#[derive(Clone, Default)]
pub struct PaymentProviders {
    providers: HashMap<PaymentMethod, Arc<dyn PaymentProvider>>,
}

impl PaymentProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cash on delivery always; the online gateway only when enabled.
    pub fn from_config(config: &PaymentsConfig) -> Self {
        let mut providers = Self::new().with(Arc::new(CashOnDeliveryProvider));
        if config.online_gateway_enabled {
            providers = providers.with(Arc::new(OnlineGatewayProvider));
        }
        providers
    }

    /// Registers `provider` under its own method, replacing any previous one.
    pub fn with(mut self, provider: Arc<dyn PaymentProvider>) -> Self {
        self.providers.insert(provider.method(), provider);
        self
    }

    pub fn get(&self, method: PaymentMethod) -> Result<Arc<dyn PaymentProvider>, PaymentError> {
        self.providers
            .get(&method)
            .cloned()
            .ok_or(PaymentError::Unsupported(method))
    }
}
