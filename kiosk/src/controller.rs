//! Kiosk controller
//!
//! Composes the screen state machine with the cart, the order session, the
//! payment modal, notifications and the ticket screen. User actions are
//! async methods; timers and background polls come back through
//! [`Kiosk::next_event`], so all state is only ever touched from the task
//! that owns the `Kiosk`.
//!
//! Losing authentication abandons the session: the cart is cleared, the
//! payment modal and ticket are closed and the order is forgotten without any
//! server call.

use std::sync::Arc;

use kiosk_client::{Credentials, KioskApi};
use shared::{ItemId, OptionId, Order, PaymentMethod};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::capture::DemographicCapture;
use crate::cart::{CartLine, CartModel};
use crate::config::KioskConfig;
use crate::error::{KioskError, KioskResult};
use crate::events::{self, EventReceiver, EventSender, EventSink, KioskEvent};
use crate::machine::{KioskState, KioskStateMachine, Transition};
use crate::menu::Menu;
use crate::notification::{Notification, NotificationKind, NotificationQueue};
use crate::payment::PaymentFlow;
use crate::session::{OrderSessionManager, PollOutcome, SessionError, Submission};
use crate::ticket::{Ticket, TicketEvent, TicketFormatter, TicketScreen};

const MSG_SENT: &str = "Sent to the kitchen!";
const MSG_SEND_FAILED: &str = "Failed to send your order. Please try again.";
const MSG_PAYMENT_FAILED: &str = "Payment failed. Please try again.";
const MSG_LOGIN_FAILED: &str = "Login failed. Check your username and password.";
const MSG_MENU_FAILED: &str = "Could not load the menu.";
const MSG_CAPTURE_FAILED: &str = "Could not read your details. Please start again.";

pub struct Kiosk {
    api: Arc<dyn KioskApi>,
    credentials: Credentials,
    auth_rx: watch::Receiver<Option<String>>,
    capture: Arc<dyn DemographicCapture>,
    config: KioskConfig,
    machine: KioskStateMachine,
    menu: Menu,
    cart: CartModel,
    session: OrderSessionManager,
    payment: Option<PaymentFlow>,
    notifications: NotificationQueue,
    ticket: Option<TicketScreen>,
    formatter: TicketFormatter,
    events_tx: EventSender,
    events_rx: EventReceiver,
}

impl Kiosk {
    pub fn new(
        api: Arc<dyn KioskApi>,
        credentials: Credentials,
        capture: Arc<dyn DemographicCapture>,
        config: KioskConfig,
    ) -> Self {
        let (events_tx, events_rx) = events::channel();
        let session = OrderSessionManager::new(
            Arc::clone(&api),
            config.poll_interval,
            EventSink::new(events_tx.clone(), KioskEvent::Session),
        );
        let notifications = NotificationQueue::new(
            config.notification_timeout,
            EventSink::new(events_tx.clone(), KioskEvent::Notification),
        );
        let mut auth_rx = credentials.subscribe();
        if credentials.is_authenticated() {
            // Restored token: the first `next_event` leaves LOGIN
            auth_rx.mark_changed();
        }

        Self {
            api,
            credentials,
            auth_rx,
            capture,
            config,
            machine: KioskStateMachine::new(),
            menu: Menu::default(),
            cart: CartModel::new(),
            session,
            payment: None,
            notifications,
            ticket: None,
            formatter: TicketFormatter::default(),
            events_tx,
            events_rx,
        }
    }

    pub fn with_formatter(mut self, formatter: TicketFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> KioskState {
        self.machine.state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn cart(&self) -> &CartModel {
        &self.cart
    }

    pub fn cart_total(&self) -> i64 {
        self.cart.total()
    }

    pub fn session(&self) -> &OrderSessionManager {
        &self.session
    }

    pub fn order(&self) -> Option<&Order> {
        self.session.order()
    }

    pub fn session_total(&self) -> i64 {
        self.session.session_total()
    }

    /// The open payment modal, if any
    pub fn payment(&self) -> Option<&PaymentFlow> {
        self.payment.as_ref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.ticket.as_ref().map(TicketScreen::ticket)
    }

    /// Printable form of the ticket currently shown
    pub fn render_ticket(&self) -> Option<String> {
        let ticket = self.ticket.as_ref()?.ticket();
        let order = self.session.order()?;
        Some(self.formatter.render(order, ticket.payment_method))
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// `POST /token`, then load the menu. LOGIN → STANDBY.
    pub async fn login(&mut self, username: &str, password: &str) -> KioskResult<()> {
        self.require(KioskState::Login)?;

        let token = match self.api.login(username, password).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(username, error = %e, "Login failed");
                self.notifications.show(MSG_LOGIN_FAILED, NotificationKind::Error);
                return Err(e.into());
            }
        };
        self.credentials.set_token(token.access_token);
        self.auth_rx.borrow_and_update();

        self.enter_standby().await?;
        tracing::info!(username, "Kiosk logged in");
        Ok(())
    }

    pub fn logout(&mut self) {
        if self.credentials.clear() {
            tracing::info!("Kiosk logged out");
        }
        self.lose_auth();
    }

    /// Re-check the credentials and follow them. Returns true if the state
    /// changed.
    ///
    /// A token present while on LOGIN (restored, or set by another holder of
    /// the credentials) loads the menu and moves to STANDBY. A missing token
    /// anywhere else abandons the session and returns to LOGIN.
    pub async fn sync_auth(&mut self) -> bool {
        self.auth_rx.borrow_and_update();
        if !self.credentials.is_authenticated() {
            return self.lose_auth();
        }
        if self.state() != KioskState::Login {
            return false;
        }
        match self.enter_standby().await {
            Ok(()) => {
                tracing::info!("Kiosk authenticated with existing token");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not resume with existing token");
                false
            }
        }
    }

    /// Load the menu for the current token, then LOGIN → STANDBY. A menu
    /// failure drops the token.
    async fn enter_standby(&mut self) -> KioskResult<()> {
        match Menu::load(self.api.as_ref()).await {
            Ok(menu) => self.menu = menu,
            Err(e) => {
                tracing::warn!(error = %e, "Menu load failed");
                self.credentials.clear();
                self.auth_rx.borrow_and_update();
                self.notifications.show(MSG_MENU_FAILED, NotificationKind::Error);
                return Err(e.into());
            }
        }
        self.machine.fire(Transition::Authenticated)?;
        Ok(())
    }

    fn lose_auth(&mut self) -> bool {
        self.auth_rx.borrow_and_update();
        if self.credentials.is_authenticated() || self.state() == KioskState::Login {
            return false;
        }
        tracing::warn!(state = %self.state(), "Authentication lost");
        self.abandon_session();
        self.menu = Menu::default();
        self.machine.fire(Transition::AuthenticationLost).is_ok()
    }

    // ========================================================================
    // Standby / attribute capture
    // ========================================================================

    /// STANDBY → ATTRIBUTE_CAPTURE, run the capture once, → ORDERING.
    ///
    /// A failed capture returns to STANDBY, and so does dropping the returned
    /// future before it completes (customer backed out, caller timed out).
    pub async fn start(&mut self) -> KioskResult<()> {
        self.require(KioskState::Standby)?;
        let capture = Arc::clone(&self.capture);
        let mut guard = CaptureGuard::enter(&mut self.machine)?;

        match capture.capture().await {
            Ok(demographics) => {
                tracing::info!(
                    age_group = %demographics.age_group,
                    gender = %demographics.gender,
                    "Attributes captured"
                );
                guard.machine.fire(Transition::AttributesCaptured)?;
                self.session.set_demographics(demographics);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Attribute capture failed");
                guard.machine.fire(Transition::CaptureFailed)?;
                self.notifications.show(MSG_CAPTURE_FAILED, NotificationKind::Error);
                Err(e.into())
            }
        }
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Add one unit of a menu item with the given options
    pub fn add_to_cart(&mut self, item_id: ItemId, option_ids: &[OptionId]) -> KioskResult<&CartLine> {
        self.require(KioskState::Ordering)?;

        let item = self.menu.find(item_id).ok_or(KioskError::UnknownItem(item_id))?;
        if item.is_sold_out() {
            return Err(KioskError::SoldOut(item_id));
        }
        let options = option_ids
            .iter()
            .map(|id| {
                item.option(*id).cloned().ok_or(KioskError::UnknownOption {
                    item: item_id,
                    option: *id,
                })
            })
            .collect::<KioskResult<Vec<_>>>()?;

        Ok(self.cart.add_line(item, options))
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Send the cart to the kitchen. The cart is only cleared on success.
    pub async fn send_order(&mut self) -> KioskResult<Submission> {
        self.require(KioskState::Ordering)?;

        let lines = self.cart.lines().to_vec();
        let cart = &mut self.cart;
        let result = self.session.send_order(&lines, || cart.clear()).await;
        match result {
            Ok(Submission::Skipped) => Ok(Submission::Skipped),
            Ok(submission) => {
                self.notifications.show(MSG_SENT, NotificationKind::Success);
                Ok(submission)
            }
            Err(e) => {
                self.report_failure(&e, MSG_SEND_FAILED);
                Err(e.into())
            }
        }
    }

    // ========================================================================
    // Payment
    // ========================================================================

    /// Open the payment modal for everything sent so far
    pub fn open_payment(&mut self) -> KioskResult<&PaymentFlow> {
        self.require(KioskState::Ordering)?;
        if self.session.order_id().is_none() {
            return Err(KioskError::NoActiveOrder);
        }
        let flow = match self.payment.take() {
            Some(flow) => flow,
            None => {
                tracing::debug!(total = self.session.session_total(), "Payment opened");
                PaymentFlow::new(
                    self.session.session_total(),
                    self.config.payment,
                    EventSink::new(self.events_tx.clone(), KioskEvent::Payment),
                )
            }
        };
        Ok(self.payment.insert(flow))
    }

    /// Close the modal; refused while processing
    pub fn close_payment(&mut self) -> KioskResult<()> {
        if let Some(flow) = self.payment.as_mut() {
            flow.cancel()?;
            self.payment = None;
            tracing::debug!("Payment closed");
        }
        Ok(())
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) -> KioskResult<()> {
        Ok(self.payment_mut()?.select_method(method)?)
    }

    pub fn confirm_payment_method(&mut self) -> KioskResult<()> {
        Ok(self.payment_mut()?.confirm()?)
    }

    pub fn payment_back(&mut self) -> KioskResult<()> {
        Ok(self.payment_mut()?.back()?)
    }

    /// The customer finished the physical step; processing starts
    pub fn complete_payment_action(&mut self) -> KioskResult<()> {
        Ok(self.payment_mut()?.complete_action()?)
    }

    fn payment_mut(&mut self) -> KioskResult<&mut PaymentFlow> {
        self.payment.as_mut().ok_or(KioskError::PaymentNotOpen)
    }

    /// Checkout with the confirmed method. ORDERING → TICKET on success.
    ///
    /// The modal closes either way; on failure the order is untouched and
    /// payment can be reopened.
    async fn finish_payment(&mut self, method: PaymentMethod) -> KioskResult<()> {
        self.payment = None;
        match self.session.checkout(method).await {
            Ok(_) => {
                self.machine.fire(Transition::CheckedOut)?;
                let order = self.session.order().ok_or(KioskError::NoActiveOrder)?;
                let ticket = self.formatter.ticket(order, Some(method));
                self.ticket = Some(TicketScreen::open(
                    ticket,
                    self.config.ticket_dismiss,
                    EventSink::new(self.events_tx.clone(), KioskEvent::Ticket),
                ));
                Ok(())
            }
            Err(e) => {
                self.report_failure(&e, MSG_PAYMENT_FAILED);
                Err(e.into())
            }
        }
    }

    // ========================================================================
    // Ticket
    // ========================================================================

    /// TICKET → STANDBY; ends the session
    pub fn complete_ticket(&mut self) -> KioskResult<()> {
        self.require(KioskState::Ticket)?;
        self.ticket = None;
        self.cart.clear();
        self.session.complete_session();
        self.machine.fire(Transition::TicketCompleted)?;
        Ok(())
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Apply one timer or poll event
    pub async fn handle_event(&mut self, event: KioskEvent) -> KioskResult<()> {
        match event {
            KioskEvent::Session(event) => {
                if let PollOutcome::Failed(e) = self.session.apply_poll(event)
                    && e.is_unauthorized()
                {
                    self.on_unauthorized();
                }
            }
            KioskEvent::Payment(event) => {
                let Some(flow) = self.payment.as_mut() else {
                    tracing::debug!(?event, "Payment event with no open payment");
                    return Ok(());
                };
                if let Some(method) = flow.handle(event) {
                    self.finish_payment(method).await?;
                }
            }
            KioskEvent::Notification(event) => self.notifications.handle(event),
            KioskEvent::Ticket(TicketEvent::AutoDismiss { seq }) => {
                if self.ticket.as_ref().is_some_and(|t| t.seq() == seq) {
                    tracing::debug!("Ticket auto-dismissed");
                    self.complete_ticket()?;
                }
            }
        }
        Ok(())
    }

    /// Wait for the next event or credential change and apply it
    pub async fn next_event(&mut self) -> KioskResult<()> {
        tokio::select! {
            changed = self.auth_rx.changed() => {
                if changed.is_ok() {
                    self.sync_auth().await;
                }
                Ok(())
            }
            Some(event) = self.events_rx.recv() => self.handle_event(event).await,
        }
    }

    /// Process events until `done` holds or `shutdown` is cancelled.
    ///
    /// Recoverable failures were already reported to the customer and are
    /// only logged; contract violations are returned.
    pub async fn run_until<F>(&mut self, shutdown: &CancellationToken, mut done: F) -> KioskResult<()>
    where
        F: FnMut(&Kiosk) -> bool,
    {
        loop {
            if done(self) {
                return Ok(());
            }
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                result = self.next_event() => {
                    if let Err(e) = result {
                        if e.is_contract_violation() {
                            return Err(e);
                        }
                        tracing::warn!(error = %e, "Event handling failed");
                    }
                }
            }
        }
    }

    /// Drop every timer and forget the session
    pub fn shutdown(&mut self) {
        self.abandon_session();
        self.notifications.dismiss();
        tracing::info!("Kiosk shut down");
    }

    /// Forget cart, payment, ticket and order without any server call
    pub fn abandon_session(&mut self) {
        if let Some(order_id) = self.session.order_id() {
            tracing::info!(order_id = %order_id, "Abandoning session");
        }
        self.cart.clear();
        self.payment = None;
        self.ticket = None;
        self.session.complete_session();
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn require(&self, expected: KioskState) -> KioskResult<()> {
        let actual = self.state();
        if actual == expected {
            Ok(())
        } else if actual == KioskState::Login {
            Err(KioskError::NotAuthenticated)
        } else {
            Err(KioskError::WrongState { expected, actual })
        }
    }

    fn on_unauthorized(&mut self) {
        self.credentials.clear();
        self.lose_auth();
    }

    fn report_failure(&mut self, error: &SessionError, message: &str) {
        if error.is_unauthorized() {
            self.on_unauthorized();
        } else if matches!(error, SessionError::Client(_)) {
            tracing::warn!(error = %error, "{}", message);
            self.notifications.show(message, NotificationKind::Error);
        }
    }
}

/// Holds the machine in ATTRIBUTE_CAPTURE; falls back to STANDBY if dropped
/// before the capture settles.
struct CaptureGuard<'a> {
    machine: &'a mut KioskStateMachine,
}

impl<'a> CaptureGuard<'a> {
    fn enter(machine: &'a mut KioskStateMachine) -> KioskResult<Self> {
        machine.fire(Transition::Start)?;
        Ok(Self { machine })
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        if self.machine.state() != KioskState::AttributeCapture {
            return;
        }
        tracing::info!("Attribute capture abandoned");
        if let Err(e) = self.machine.fire(Transition::CaptureFailed) {
            tracing::error!(error = %e, "Could not leave attribute capture");
        }
    }
}
