//! Script execution: one conversational turn per call
//!
//! The executor is a dispatch table keyed by intent. Each handler takes the
//! session state by value, calls at most one collaborator, builds widget
//! messages, and returns the updated state; the input state is never
//! mutated in place. Collaborator failures become an apology plus an
//! escalation offer; the UI never sees a raw error.

use std::sync::Arc;

use concierge_core::{
    normalize_filters, EngineError, EscalationFormSpec, Filters, Intent,
    IntentPayload, MessageBody, ModuleBody, OrderDesk, OrderLookupForm, Product, ProductCatalog,
    ProductFilterForm, ProductQuery, ProductRef, Result, ReturnOption, ReturnOptionChoice,
    ReturnRequest, ReturnsDesk, SessionState, StylistDesk, StylistRequest, WidgetMessage,
};

use crate::copy;

/// One turn's input: a classified (or widget-supplied) intent, its payload,
/// and the caller-owned session state.
#[derive(Debug)]
pub struct TurnRequest {
    pub intent: Intent,
    pub payload: IntentPayload,
    pub state: SessionState,
}

/// One turn's output: messages for the widget and the new session state.
#[derive(Debug)]
pub struct TurnOutcome {
    pub messages: Vec<WidgetMessage>,
    pub state: SessionState,
}

/// Executes dialogue scripts against the backend collaborators.
pub struct ScriptExecutor {
    catalog: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderDesk>,
    returns: Arc<dyn ReturnsDesk>,
    stylists: Arc<dyn StylistDesk>,
}

impl ScriptExecutor {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        orders: Arc<dyn OrderDesk>,
        returns: Arc<dyn ReturnsDesk>,
        stylists: Arc<dyn StylistDesk>,
    ) -> Self {
        Self {
            catalog,
            orders,
            returns,
            stylists,
        }
    }

    /// Run one conversational turn.
    ///
    /// Validation failures return [`EngineError::InvalidRequest`] before any
    /// external call; everything else resolves to messages, worst case an
    /// apology with an escalation offer.
    pub async fn execute(&self, request: TurnRequest) -> Result<TurnOutcome> {
        let TurnRequest {
            intent,
            payload,
            state,
        } = request;

        let mut state = state.touched();
        // Clarify is not a user goal; keep the previous intent so a
        // follow-up continuation can still resolve against it.
        if intent != Intent::Clarify {
            state.last_intent = Some(intent);
        }

        match intent {
            Intent::FindProduct => self.find_product(payload, state).await,
            Intent::TrackOrder => self.track_order(payload, state).await,
            Intent::ReturnExchange => self.return_exchange(payload, state).await,
            Intent::StylistContact => self.stylist_contact(payload, state).await,
            Intent::Csat => self.csat(payload, state),
            Intent::CareWarranty | Intent::SizingRepairs | Intent::Financing => {
                Ok(guidance_turn(intent, state))
            }
            Intent::Clarify => Ok(clarify_turn(state)),
        }
    }

    async fn find_product(
        &self,
        payload: IntentPayload,
        mut state: SessionState,
    ) -> Result<TurnOutcome> {
        match payload {
            IntentPayload::None => {
                let messages = vec![
                    WidgetMessage::text(Intent::FindProduct, copy::FILTER_PROMPT),
                    WidgetMessage::module(
                        Intent::FindProduct,
                        ModuleBody::ProductFilter(ProductFilterForm::default()),
                    ),
                ];
                Ok(TurnOutcome { messages, state })
            }
            IntentPayload::SubmitProductFilters { filters } => {
                let filters = normalize_filters(filters);
                // Business rule: this flow only ever surfaces pieces that
                // can ship today, regardless of what the caller asked for.
                let query = ProductQuery {
                    ready_to_ship: Some(true),
                    category: filters.category.clone(),
                    metal: filters.metal.clone(),
                    price_min: filters.price_min,
                    price_max: filters.price_max,
                    carat_min: filters.carat_min,
                    carat_max: filters.carat_max,
                };

                let products = match self.catalog.search(&query).await {
                    Ok(products) => products,
                    Err(error) => {
                        return Ok(self.collaborator_failure(
                            "product search",
                            Intent::FindProduct,
                            error,
                            state,
                        ))
                    }
                };

                let products: Vec<Product> = products
                    .into_iter()
                    .filter(|p| p.ready_to_ship)
                    .filter(|p| matches_filters(p, &filters))
                    .collect();

                state.shortlist = products.iter().map(ProductRef::from).collect();
                state.last_filters = Some(filters);

                let prompt = if products.is_empty() {
                    copy::CAROUSEL_EMPTY_PROMPT
                } else {
                    copy::CAROUSEL_PROMPT
                };
                let messages = vec![
                    WidgetMessage::text(Intent::FindProduct, prompt),
                    WidgetMessage::module(
                        Intent::FindProduct,
                        ModuleBody::ProductCarousel { products },
                    ),
                ];
                Ok(TurnOutcome { messages, state })
            }
            other => Err(unexpected_payload(Intent::FindProduct, &other)),
        }
    }

    async fn track_order(
        &self,
        payload: IntentPayload,
        mut state: SessionState,
    ) -> Result<TurnOutcome> {
        match payload {
            IntentPayload::None => {
                let messages = vec![
                    WidgetMessage::text(Intent::TrackOrder, copy::ORDER_LOOKUP_PROMPT),
                    WidgetMessage::module(
                        Intent::TrackOrder,
                        ModuleBody::OrderLookup(OrderLookupForm::default()),
                    ),
                ];
                Ok(TurnOutcome { messages, state })
            }
            IntentPayload::SubmitOrderLookup { lookup } => {
                if !lookup.has_credentials() {
                    return Err(EngineError::InvalidRequest(
                        "order lookup requires an order number, or email and postal code"
                            .to_string(),
                    ));
                }

                match self.orders.status(&lookup).await {
                    Ok(timeline) => {
                        let mut messages = vec![WidgetMessage::concierge(
                            MessageBody::OrderStatus {
                                reference: timeline.reference,
                                entries: timeline.entries,
                            },
                            Some(Intent::TrackOrder),
                        )];
                        offer_csat(&mut messages, &mut state);
                        Ok(TurnOutcome { messages, state })
                    }
                    // Opaque on purpose: a miss and an ownership mismatch
                    // read identically to the user.
                    Err(EngineError::OrderNotFound) => {
                        let messages =
                            vec![WidgetMessage::text(Intent::TrackOrder, copy::ORDER_MISS_PROMPT)];
                        Ok(TurnOutcome { messages, state })
                    }
                    Err(error) => Ok(self.collaborator_failure(
                        "order status",
                        Intent::TrackOrder,
                        error,
                        state,
                    )),
                }
            }
            other => Err(unexpected_payload(Intent::TrackOrder, &other)),
        }
    }

    async fn return_exchange(
        &self,
        payload: IntentPayload,
        mut state: SessionState,
    ) -> Result<TurnOutcome> {
        match payload {
            IntentPayload::None => {
                let messages = vec![
                    WidgetMessage::text(Intent::ReturnExchange, copy::RETURN_OPTIONS_PROMPT),
                    WidgetMessage::module(
                        Intent::ReturnExchange,
                        ModuleBody::ReturnOptions {
                            options: return_choices(),
                        },
                    ),
                ];
                Ok(TurnOutcome { messages, state })
            }
            IntentPayload::SelectReturnOption {
                order_id,
                option,
                reason,
                notes,
            } => {
                if order_id.trim().is_empty() {
                    return Err(EngineError::InvalidRequest(
                        "return selection requires an order id".to_string(),
                    ));
                }

                let request = ReturnRequest {
                    order_id,
                    option,
                    reason,
                    notes,
                };
                match self.returns.open_return(&request).await {
                    Ok(receipt) => {
                        let mut messages =
                            vec![WidgetMessage::text(Intent::ReturnExchange, receipt.message)];
                        offer_csat(&mut messages, &mut state);
                        Ok(TurnOutcome { messages, state })
                    }
                    Err(error) => Ok(self.collaborator_failure(
                        "returns",
                        Intent::ReturnExchange,
                        error,
                        state,
                    )),
                }
            }
            other => Err(unexpected_payload(Intent::ReturnExchange, &other)),
        }
    }

    async fn stylist_contact(
        &self,
        payload: IntentPayload,
        state: SessionState,
    ) -> Result<TurnOutcome> {
        match payload {
            IntentPayload::None => {
                let messages = vec![
                    WidgetMessage::text(Intent::StylistContact, copy::ESCALATION_PROMPT),
                    WidgetMessage::module(
                        Intent::StylistContact,
                        ModuleBody::EscalationForm(EscalationFormSpec::default()),
                    ),
                ];
                Ok(TurnOutcome { messages, state })
            }
            IntentPayload::RequestStylist { contact } => {
                let request = StylistRequest {
                    session_id: state.id.clone(),
                    contact,
                };
                match self.stylists.request_contact(&request).await {
                    Ok(receipt) => {
                        let messages =
                            vec![WidgetMessage::text(Intent::StylistContact, receipt.message)];
                        Ok(TurnOutcome { messages, state })
                    }
                    Err(error) => Ok(self.collaborator_failure(
                        "stylist desk",
                        Intent::StylistContact,
                        error,
                        state,
                    )),
                }
            }
            other => Err(unexpected_payload(Intent::StylistContact, &other)),
        }
    }

    fn csat(&self, payload: IntentPayload, mut state: SessionState) -> Result<TurnOutcome> {
        match payload {
            IntentPayload::None => {
                state.has_shown_csat = true;
                let messages = vec![WidgetMessage::concierge(
                    MessageBody::CsatBar {
                        prompt: copy::CSAT_PROMPT.to_string(),
                    },
                    Some(Intent::Csat),
                )];
                Ok(TurnOutcome { messages, state })
            }
            IntentPayload::SubmitCsat { rating } => {
                state.has_shown_csat = true;
                let mut messages = vec![WidgetMessage::text(Intent::Csat, copy::CSAT_THANKS)];
                // Auto-escalation on negative feedback is required behavior,
                // not optional UI sugar.
                if rating.is_negative() {
                    messages.push(WidgetMessage::text(Intent::Csat, copy::CSAT_FOLLOW_UP));
                    messages.push(WidgetMessage::module(
                        Intent::StylistContact,
                        ModuleBody::EscalationForm(EscalationFormSpec::default()),
                    ));
                }
                Ok(TurnOutcome { messages, state })
            }
            other => Err(unexpected_payload(Intent::Csat, &other)),
        }
    }

    fn collaborator_failure(
        &self,
        service: &'static str,
        intent: Intent,
        error: EngineError,
        state: SessionState,
    ) -> TurnOutcome {
        tracing::warn!(service, %error, session = %state.id, "collaborator call failed");
        let messages = vec![
            WidgetMessage::text(intent, copy::APOLOGY_PROMPT),
            WidgetMessage::module(
                Intent::StylistContact,
                ModuleBody::EscalationForm(EscalationFormSpec::default()),
            ),
        ];
        TurnOutcome { messages, state }
    }
}

/// Offer the rating bar once per session, at a resolution point.
fn offer_csat(messages: &mut Vec<WidgetMessage>, state: &mut SessionState) {
    if !state.has_shown_csat {
        state.has_shown_csat = true;
        messages.push(WidgetMessage::concierge(
            MessageBody::CsatBar {
                prompt: copy::CSAT_PROMPT.to_string(),
            },
            Some(Intent::Csat),
        ));
    }
}

fn guidance_turn(intent: Intent, state: SessionState) -> TurnOutcome {
    // Closed set: guidance() covers exactly these intents.
    let text = copy::guidance(intent).unwrap_or(copy::CLARIFY_PROMPT);
    TurnOutcome {
        messages: vec![WidgetMessage::text(intent, text)],
        state,
    }
}

fn clarify_turn(state: SessionState) -> TurnOutcome {
    TurnOutcome {
        messages: vec![WidgetMessage::text(Intent::Clarify, copy::CLARIFY_PROMPT)],
        state,
    }
}

fn return_choices() -> Vec<ReturnOptionChoice> {
    vec![
        ReturnOptionChoice {
            option: ReturnOption::Resize.as_str().to_string(),
            label: "Resize this piece".to_string(),
        },
        ReturnOptionChoice {
            option: ReturnOption::Return.as_str().to_string(),
            label: "Return or exchange".to_string(),
        },
        ReturnOptionChoice {
            option: ReturnOption::Care.as_str().to_string(),
            label: "Send in for care".to_string(),
        },
    ]
}

fn unexpected_payload(intent: Intent, payload: &IntentPayload) -> EngineError {
    EngineError::InvalidRequest(format!(
        "payload {payload:?} is not valid for intent {intent}"
    ))
}

/// Client-side re-check of the requested filters; the collaborator applies
/// the query too, but a mismatch must never leak through.
fn matches_filters(product: &Product, filters: &Filters) -> bool {
    if let Some(min) = filters.price_min {
        if product.price < min {
            return false;
        }
    }
    if let Some(max) = filters.price_max {
        if product.price > max {
            return false;
        }
    }
    if let (Some(want), Some(have)) = (&filters.category, &product.category) {
        if want != have {
            return false;
        }
    }
    if let (Some(want), Some(have)) = (&filters.metal, &product.metal) {
        if want != have {
            return false;
        }
    }
    true
}
