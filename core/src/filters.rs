//! Catalog search filters and their query-string mapping.
//!
//! # Design
//! The filter set always carries its complete key set — unset text
//! fields are empty strings, unset amenities are `false` — so a patch
//! merge is shallow and a reset is exactly `Default::default()`. The
//! query mapping is a single enumerated table: four range fields rename
//! to the backend's `__gte`/`__lte` lookups, everything else keeps its
//! name, and empty strings and `false` flags are omitted from the query
//! entirely.

use serde::{Deserialize, Serialize};

/// Default ordering: newest first.
pub const DEFAULT_ORDERING: &str = "-criado_em";

/// The active catalog filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilters {
    pub tipo_negocio: String,
    pub tipo_imovel: String,
    pub cidade: String,
    pub bairro: String,
    pub preco_min: String,
    pub preco_max: String,
    pub area_min: String,
    pub area_max: String,
    pub quartos: String,
    pub banheiros: String,
    pub vagas_garagem: String,
    pub piscina: bool,
    pub aceita_pets: bool,
    pub mobiliado: bool,
    pub search: String,
    pub ordering: String,
}

impl Default for ListingFilters {
    fn default() -> Self {
        Self {
            tipo_negocio: String::new(),
            tipo_imovel: String::new(),
            cidade: String::new(),
            bairro: String::new(),
            preco_min: String::new(),
            preco_max: String::new(),
            area_min: String::new(),
            area_max: String::new(),
            quartos: String::new(),
            banheiros: String::new(),
            vagas_garagem: String::new(),
            piscina: false,
            aceita_pets: false,
            mobiliado: false,
            search: String::new(),
            ordering: DEFAULT_ORDERING.to_string(),
        }
    }
}

impl ListingFilters {
    /// Serialize the non-empty filters into query parameters, applying
    /// the backend's lookup renames.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_text(&mut params, "tipo_negocio", &self.tipo_negocio);
        push_text(&mut params, "tipo_imovel", &self.tipo_imovel);
        push_text(&mut params, "cidade", &self.cidade);
        push_text(&mut params, "bairro", &self.bairro);
        push_text(&mut params, "preco_venda__gte", &self.preco_min);
        push_text(&mut params, "preco_venda__lte", &self.preco_max);
        push_text(&mut params, "area_total__gte", &self.area_min);
        push_text(&mut params, "area_total__lte", &self.area_max);
        push_text(&mut params, "quartos", &self.quartos);
        push_text(&mut params, "banheiros", &self.banheiros);
        push_text(&mut params, "vagas_garagem", &self.vagas_garagem);
        push_flag(&mut params, "piscina", self.piscina);
        push_flag(&mut params, "aceita_pets", self.aceita_pets);
        push_flag(&mut params, "mobiliado", self.mobiliado);
        push_text(&mut params, "search", &self.search);
        push_text(&mut params, "ordering", &self.ordering);
        params
    }
}

fn push_text(params: &mut Vec<(&'static str, String)>, key: &'static str, value: &str) {
    if !value.is_empty() {
        params.push((key, value.to_string()));
    }
}

fn push_flag(params: &mut Vec<(&'static str, String)>, key: &'static str, value: bool) {
    if value {
        params.push((key, "true".to_string()));
    }
}

/// Shallow filter patch; only the named fields are overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub tipo_negocio: Option<String>,
    pub tipo_imovel: Option<String>,
    pub cidade: Option<String>,
    pub bairro: Option<String>,
    pub preco_min: Option<String>,
    pub preco_max: Option<String>,
    pub area_min: Option<String>,
    pub area_max: Option<String>,
    pub quartos: Option<String>,
    pub banheiros: Option<String>,
    pub vagas_garagem: Option<String>,
    pub piscina: Option<bool>,
    pub aceita_pets: Option<bool>,
    pub mobiliado: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl FilterPatch {
    pub fn apply(&self, filters: &mut ListingFilters) {
        if let Some(v) = &self.tipo_negocio {
            filters.tipo_negocio = v.clone();
        }
        if let Some(v) = &self.tipo_imovel {
            filters.tipo_imovel = v.clone();
        }
        if let Some(v) = &self.cidade {
            filters.cidade = v.clone();
        }
        if let Some(v) = &self.bairro {
            filters.bairro = v.clone();
        }
        if let Some(v) = &self.preco_min {
            filters.preco_min = v.clone();
        }
        if let Some(v) = &self.preco_max {
            filters.preco_max = v.clone();
        }
        if let Some(v) = &self.area_min {
            filters.area_min = v.clone();
        }
        if let Some(v) = &self.area_max {
            filters.area_max = v.clone();
        }
        if let Some(v) = &self.quartos {
            filters.quartos = v.clone();
        }
        if let Some(v) = &self.banheiros {
            filters.banheiros = v.clone();
        }
        if let Some(v) = &self.vagas_garagem {
            filters.vagas_garagem = v.clone();
        }
        if let Some(v) = self.piscina {
            filters.piscina = v;
        }
        if let Some(v) = self.aceita_pets {
            filters.aceita_pets = v;
        }
        if let Some(v) = self.mobiliado {
            filters.mobiliado = v;
        }
        if let Some(v) = &self.search {
            filters.search = v.clone();
        }
        if let Some(v) = &self.ordering {
            filters.ordering = v.clone();
        }
    }

    /// The patch applied over a copy of `filters`, leaving them intact.
    pub fn merged_over(&self, filters: &ListingFilters) -> ListingFilters {
        let mut merged = filters.clone();
        self.apply(&mut merged);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_carries_only_the_ordering() {
        let params = ListingFilters::default().to_query();
        assert_eq!(params, vec![("ordering", DEFAULT_ORDERING.to_string())]);
    }

    #[test]
    fn range_fields_rename_and_false_flags_are_omitted() {
        let filters = ListingFilters {
            preco_min: "100".to_string(),
            preco_max: "500".to_string(),
            piscina: true,
            ..Default::default()
        };
        let params = filters.to_query();
        assert_eq!(
            params,
            vec![
                ("preco_venda__gte", "100".to_string()),
                ("preco_venda__lte", "500".to_string()),
                ("piscina", "true".to_string()),
                ("ordering", DEFAULT_ORDERING.to_string()),
            ]
        );
    }

    #[test]
    fn area_range_renames() {
        let filters = ListingFilters {
            area_min: "80".to_string(),
            area_max: "200".to_string(),
            ordering: String::new(),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("area_total__gte", "80".to_string()),
                ("area_total__lte", "200".to_string()),
            ]
        );
    }

    #[test]
    fn patch_then_clear_restores_the_exact_default() {
        let mut filters = ListingFilters::default();
        FilterPatch {
            cidade: Some("Recife".to_string()),
            ..Default::default()
        }
        .apply(&mut filters);
        assert_eq!(filters.cidade, "Recife");

        filters = ListingFilters::default();
        FilterPatch::default().apply(&mut filters);
        assert_eq!(filters, ListingFilters::default());
    }

    #[test]
    fn merged_over_does_not_mutate_the_base() {
        let base = ListingFilters::default();
        let patch = FilterPatch {
            tipo_negocio: Some("venda".to_string()),
            piscina: Some(true),
            ..Default::default()
        };
        let merged = patch.merged_over(&base);
        assert_eq!(merged.tipo_negocio, "venda");
        assert!(merged.piscina);
        assert_eq!(base, ListingFilters::default());
    }

    #[test]
    fn every_field_serializes_under_its_wire_name() {
        let filters = ListingFilters {
            tipo_negocio: "venda".to_string(),
            tipo_imovel: "casa".to_string(),
            cidade: "Recife".to_string(),
            bairro: "Boa Viagem".to_string(),
            preco_min: "100".to_string(),
            preco_max: "500".to_string(),
            area_min: "80".to_string(),
            area_max: "200".to_string(),
            quartos: "3".to_string(),
            banheiros: "2".to_string(),
            vagas_garagem: "1".to_string(),
            piscina: true,
            aceita_pets: true,
            mobiliado: true,
            search: "piscina".to_string(),
            ordering: "preco".to_string(),
        };
        let keys: Vec<&str> = filters.to_query().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "tipo_negocio",
                "tipo_imovel",
                "cidade",
                "bairro",
                "preco_venda__gte",
                "preco_venda__lte",
                "area_total__gte",
                "area_total__lte",
                "quartos",
                "banheiros",
                "vagas_garagem",
                "piscina",
                "aceita_pets",
                "mobiliado",
                "search",
                "ordering",
            ]
        );
    }
}
