// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Zone pricing table: fare rules per (zone, service) pair.
//!
//! The editor is `Closed`, `Creating` or `Editing(id)`. Each save goes
//! through a per-form [`SubmitState`] so a second submit cannot start while
//! one is in flight.

use crate::error::{AppError, Result};
use crate::models::{Service, Zone, ZonePrice, ZonePriceForm};
use crate::services::backend::BackendClient;
use serde::Serialize;
use validator::Validate;

const SAVE_FAILED: &str = "Failed to save zone price";
const LOAD_FAILED: &str = "Failed to load zone prices";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "id", rename_all = "snake_case")]
pub enum EditorState {
    Closed,
    Creating,
    Editing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SubmitState {
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

/// One entry of a `<select>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
}

impl From<&Zone> for SelectOption {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id.clone(),
            name: zone.name.clone(),
        }
    }
}

impl From<&Service> for SelectOption {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id.clone(),
            name: service.name.clone(),
        }
    }
}

/// A validated save that still has to reach the backend.
#[derive(Debug, Clone)]
pub struct PendingSubmit {
    /// `None` creates, `Some(id)` updates
    pub target: Option<String>,
    pub form: ZonePriceForm,
}

impl PendingSubmit {
    pub async fn send(&self, backend: &BackendClient) -> Result<()> {
        let result = match &self.target {
            None => backend.create_zone_price(&self.form).await,
            Some(id) => backend.update_zone_price(id, &self.form).await,
        };
        result.map_err(|e| e.with_fallback(SAVE_FAILED))
    }
}

pub struct ZonePricingTable {
    backend: BackendClient,
    prices: Vec<ZonePrice>,
    editor: EditorState,
    form: ZonePriceForm,
    submit_state: SubmitState,
    zone_options: Vec<SelectOption>,
    service_options: Vec<SelectOption>,
}

impl ZonePricingTable {
    pub fn new(backend: BackendClient) -> Self {
        Self {
            backend,
            prices: Vec::new(),
            editor: EditorState::Closed,
            form: ZonePriceForm::default(),
            submit_state: SubmitState::Idle,
            zone_options: Vec::new(),
            service_options: Vec::new(),
        }
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    /// Fetch all fare rules, replacing the local list.
    pub async fn list_prices(&mut self) -> Result<&[ZonePrice]> {
        self.prices = self
            .backend
            .list_zone_prices()
            .await
            .map_err(|e| e.with_fallback(LOAD_FAILED))?;
        tracing::debug!(count = self.prices.len(), "Zone prices loaded");
        Ok(&self.prices)
    }

    pub fn prices(&self) -> &[ZonePrice] {
        &self.prices
    }

    pub fn find(&self, id: &str) -> Option<&ZonePrice> {
        self.prices.iter().find(|p| p.id == id)
    }

    /// Fill the zone selector from the registry's zones.
    pub fn set_zone_options(&mut self, zones: &[Zone]) {
        self.zone_options = zones.iter().map(SelectOption::from).collect();
    }

    pub fn zone_options(&self) -> &[SelectOption] {
        &self.zone_options
    }

    /// Fetch services for the service selector.
    pub async fn load_service_options(&mut self) -> Result<&[SelectOption]> {
        let services = self
            .backend
            .list_services()
            .await
            .map_err(|e| e.with_fallback("Failed to load services"))?;
        self.service_options = services.iter().map(SelectOption::from).collect();
        Ok(&self.service_options)
    }

    pub fn service_options(&self) -> &[SelectOption] {
        &self.service_options
    }

    /// Open the editor on an existing rule, or on empty defaults.
    pub fn open_editor(&mut self, existing: Option<&ZonePrice>) -> &ZonePriceForm {
        match existing {
            Some(price) => {
                self.editor = EditorState::Editing(price.id.clone());
                self.form = ZonePriceForm::from(price);
            }
            None => {
                self.editor = EditorState::Creating;
                self.form = ZonePriceForm::default();
            }
        }
        self.submit_state = SubmitState::Idle;
        &self.form
    }

    /// Cancel editing. Refused while a save is in flight.
    pub fn close_editor(&mut self) -> Result<()> {
        if self.submit_state == SubmitState::Submitting {
            return Err(AppError::Busy);
        }
        self.editor = EditorState::Closed;
        self.form = ZonePriceForm::default();
        self.submit_state = SubmitState::Idle;
        Ok(())
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn form(&self) -> &ZonePriceForm {
        &self.form
    }

    pub fn submit_state(&self) -> &SubmitState {
        &self.submit_state
    }

    /// Validate `form` and mark the editor as submitting.
    ///
    /// Nothing is sent yet; validation failures never reach the backend.
    pub fn begin_submit(&mut self, form: ZonePriceForm) -> Result<PendingSubmit> {
        if self.submit_state == SubmitState::Submitting {
            return Err(AppError::Busy);
        }

        let target = match &self.editor {
            EditorState::Closed => {
                return Err(AppError::Validation("the editor is not open".to_string()))
            }
            EditorState::Creating => None,
            EditorState::Editing(id) => Some(id.clone()),
        };

        let form = form.trimmed();
        self.form = form.clone();
        if let Err(errors) = form.validate() {
            let err = AppError::from(errors);
            self.submit_state = SubmitState::Failed(err.to_string());
            return Err(err);
        }

        self.submit_state = SubmitState::Submitting;
        Ok(PendingSubmit { target, form })
    }

    /// Record the backend's answer.
    ///
    /// Success closes the editor and refetches the list once; failure keeps
    /// the editor open with the error text.
    pub async fn finish_submit(&mut self, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => {
                tracing::info!(editor = ?self.editor, "Zone price saved");
                self.submit_state = SubmitState::Succeeded;
                self.editor = EditorState::Closed;
                self.form = ZonePriceForm::default();
                if let Err(e) = self.list_prices().await {
                    tracing::warn!(error = %e, "Zone price list refresh failed after save");
                }
                Ok(())
            }
            Err(e) => {
                let e = e.with_fallback(SAVE_FAILED);
                self.submit_state = SubmitState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Validate, send and record a save in one go.
    pub async fn submit(&mut self, form: ZonePriceForm) -> Result<()> {
        let pending = self.begin_submit(form)?;
        let outcome = pending.send(&self.backend).await;
        self.finish_submit(outcome).await
    }

    /// Remove a rule from the local view. The backend is not told.
    pub fn delete_price(&mut self, id: &str) -> bool {
        let before = self.prices.len();
        self.prices.retain(|p| p.id != id);
        self.prices.len() != before
    }
}
