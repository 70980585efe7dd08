//! Read-only token catalog.

use il_calc_domain::entities::{Token, TokenId};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::errors::ResolverError;
use crate::providers::PriceResolver;

/// Token list loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct TokenCatalog {
    tokens: Vec<Token>,
    index: HashMap<TokenId, usize>,
}

impl TokenCatalog {
    /// Builds a catalog, keeping the first entry for duplicate ids.
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut unique = Vec::with_capacity(tokens.len());
        let mut index = HashMap::with_capacity(tokens.len());
        for token in tokens {
            if index.contains_key(&token.id) {
                continue;
            }
            index.insert(token.id.clone(), unique.len());
            unique.push(token);
        }
        Self {
            tokens: unique,
            index,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Fetches the catalog from a resolver.
    ///
    /// # Errors
    /// Returns [`ResolverError::CatalogUnavailable`] if the index cannot be reached.
    pub async fn load(resolver: &dyn PriceResolver) -> Result<Self, ResolverError> {
        let tokens = resolver.list_tokens().await?;
        let catalog = Self::new(tokens);
        info!(provider = resolver.id(), tokens = catalog.len(), "Token catalog loaded");
        Ok(catalog)
    }

    /// Fetches the catalog, degrading to an empty one on failure.
    pub async fn load_or_empty(resolver: &dyn PriceResolver) -> Self {
        match Self::load(resolver).await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(provider = resolver.id(), error = %e, "Token catalog unavailable, continuing with an empty list");
                Self::empty()
            }
        }
    }

    pub fn get(&self, id: &TokenId) -> Option<&Token> {
        self.index.get(id).map(|&i| &self.tokens[i])
    }

    pub fn contains(&self, id: &TokenId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Selectable `(id, "SYMBOL - Name")` pairs in catalog order.
    pub fn options(&self) -> impl Iterator<Item = (&TokenId, String)> {
        self.tokens.iter().map(|token| (&token.id, token.label()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::StaticPriceProvider;

    #[tokio::test]
    async fn test_load_catalog() {
        let provider = StaticPriceProvider::new()
            .with_token(Token::new("bitcoin", "btc", "Bitcoin"))
            .with_token(Token::new("ethereum", "eth", "Ethereum"))
            .with_token(Token::new("bitcoin", "btc", "Bitcoin (dup)"));

        let catalog = TokenCatalog::load(&provider).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get(&TokenId::from("bitcoin")).map(|t| t.name.as_str()),
            Some("Bitcoin")
        );

        let options: Vec<_> = catalog.options().map(|(_, label)| label).collect();
        assert_eq!(options, vec!["BTC - Bitcoin", "ETH - Ethereum"]);
    }

    #[tokio::test]
    async fn test_load_or_empty_degrades() {
        let provider = StaticPriceProvider::new()
            .with_token(Token::new("bitcoin", "btc", "Bitcoin"))
            .with_catalog_offline();

        assert!(TokenCatalog::load(&provider).await.is_err());
        let catalog = TokenCatalog::load_or_empty(&provider).await;
        assert!(catalog.is_empty());
        assert!(!catalog.contains(&TokenId::from("bitcoin")));
    }
}
