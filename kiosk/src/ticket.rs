//! Ticket screen and printable ticket
//!
//! The call number is a display aid derived from the order id; it is not
//! unique across days and is never stored.

use std::fmt;
use std::time::Duration;

use shared::order::pricing::format_amount;
use shared::{Order, OrderId, PaymentMethod};

use crate::events::EventSink;
use crate::scheduler::{ScheduledTask, next_generation};

/// 58mm paper
pub const DEFAULT_WIDTH: usize = 32;

/// Last three digits of the order id, zero padded
pub fn call_number(order_id: OrderId) -> String {
    format!("{:03}", order_id.value().unsigned_abs() % 1000)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub order_id: OrderId,
    pub call_number: String,
    pub total: i64,
    pub item_count: u32,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketEvent {
    AutoDismiss { seq: u64 },
}

/// Fixed-width text layout
#[derive(Debug, Clone, Copy)]
pub struct TicketFormatter {
    width: usize,
}

impl Default for TicketFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl TicketFormatter {
    pub fn new(width: usize) -> Self {
        Self { width: width.max(16) }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn ticket(&self, order: &Order, method: Option<PaymentMethod>) -> Ticket {
        Ticket {
            order_id: order.id,
            call_number: call_number(order.id),
            total: order.total(),
            item_count: order.item_count(),
            payment_method: method.or(order.payment_method),
        }
    }

    /// Render the ticket as plain text, one `\n`-terminated line per row
    pub fn render(&self, order: &Order, method: Option<PaymentMethod>) -> String {
        let ticket = self.ticket(order, method);
        let mut out = TextBuilder::new(self.width);

        out.sep_double()
            .center("ORDER TICKET")
            .center(&format!("No. {}", ticket.call_number))
            .sep_double();

        for item in &order.items {
            out.line_lr(
                &format!("{} x{}", item.item.name, item.quantity),
                &format_amount(item.line_total()),
            );
            for option in &item.options {
                out.line(&format!("  + {}", option.name));
            }
        }

        out.sep_single()
            .line_lr("TOTAL", &format_amount(ticket.total));
        if let Some(method) = ticket.payment_method {
            out.line_lr("Paid by", method.label());
        }
        out.sep_double();
        out.finish()
    }
}

struct TextBuilder {
    buf: String,
    width: usize,
}

impl TextBuilder {
    fn new(width: usize) -> Self {
        Self {
            buf: String::with_capacity(width * 16),
            width,
        }
    }

    fn line(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s);
        self.buf.push('\n');
        self
    }

    fn center(&mut self, s: &str) -> &mut Self {
        let pad = self.width.saturating_sub(s.chars().count()) / 2;
        let padded = format!("{}{}", " ".repeat(pad), s);
        self.line(&padded)
    }

    fn sep_double(&mut self) -> &mut Self {
        self.line(&"=".repeat(self.width))
    }

    fn sep_single(&mut self) -> &mut Self {
        self.line(&"-".repeat(self.width))
    }

    /// Left text left-aligned, right text right-aligned
    fn line_lr(&mut self, left: &str, right: &str) -> &mut Self {
        let lw = left.chars().count();
        let rw = right.chars().count();
        let joined = if lw + rw >= self.width {
            format!("{} {}", left, right)
        } else {
            format!("{}{}{}", left, " ".repeat(self.width - lw - rw), right)
        };
        self.line(&joined)
    }

    fn finish(self) -> String {
        self.buf
    }
}

/// The ticket view, auto-dismissed after a fixed delay
pub struct TicketScreen {
    ticket: Ticket,
    seq: u64,
    _timer: ScheduledTask,
}

impl TicketScreen {
    pub fn open(ticket: Ticket, dismiss_after: Duration, sink: EventSink<TicketEvent>) -> Self {
        let seq = next_generation();
        tracing::info!(call_number = %ticket.call_number, order_id = %ticket.order_id, "Ticket shown");
        let timer = ScheduledTask::once(
            "ticket-dismiss",
            dismiss_after,
            sink,
            TicketEvent::AutoDismiss { seq },
        );
        Self {
            ticket,
            seq,
            _timer: timer,
        }
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Debug for TicketScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketScreen")
            .field("ticket", &self.ticket)
            .field("seq", &self.seq)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{self, KioskEvent};
    use crate::test_support::{gyoza, ramen};
    use shared::{OrderItem, OrderStatus};

    fn order(id: i64) -> Order {
        let ramen = ramen();
        let chashu = ramen.options[0].clone();
        Order {
            id: OrderId(id),
            created_at: Default::default(),
            status: OrderStatus::Completed,
            payment_method: Some(PaymentMethod::Cash),
            age_group: None,
            gender: None,
            items: vec![
                OrderItem {
                    id: 1,
                    item: ramen,
                    quantity: 1,
                    options: vec![chashu],
                },
                OrderItem {
                    id: 2,
                    item: gyoza(),
                    quantity: 2,
                    options: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_call_number() {
        assert_eq!(call_number(OrderId(123)), "123");
        assert_eq!(call_number(OrderId(4)), "004");
        assert_eq!(call_number(OrderId(0)), "000");
        assert_eq!(call_number(OrderId(98_765)), "765");
        assert_eq!(call_number(OrderId(1000)), "000");
    }

    #[test]
    fn test_ticket_summary() {
        let ticket = TicketFormatter::default().ticket(&order(42), None);
        assert_eq!(ticket.call_number, "042");
        assert_eq!(ticket.total, 880 + 900);
        assert_eq!(ticket.item_count, 3);
        assert_eq!(ticket.payment_method, Some(PaymentMethod::Cash));

        let ticket = TicketFormatter::default().ticket(&order(42), Some(PaymentMethod::EMoney));
        assert_eq!(ticket.payment_method, Some(PaymentMethod::EMoney));
    }

    #[test]
    fn test_render_layout() {
        let text = TicketFormatter::new(32).render(&order(7), None);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines.iter().any(|l| l.trim() == "No. 007"));
        assert!(lines.contains(&"  + Extra chashu"));

        let ramen = lines.iter().find(|l| l.starts_with("Ramen x1")).unwrap();
        assert!(ramen.ends_with("¥880"));
        assert_eq!(ramen.chars().count(), 32);

        let total = lines.iter().find(|l| l.starts_with("TOTAL")).unwrap();
        assert!(total.ends_with("¥1,780"));
        assert!(lines.iter().any(|l| l.starts_with("Paid by") && l.ends_with("Cash")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_screen_auto_dismiss_event() {
        let (tx, mut rx) = events::channel();
        let ticket = TicketFormatter::default().ticket(&order(5), None);
        let screen = TicketScreen::open(
            ticket,
            Duration::from_secs(8),
            EventSink::new(tx, KioskEvent::Ticket),
        );

        match rx.recv().await {
            Some(KioskEvent::Ticket(TicketEvent::AutoDismiss { seq })) => {
                assert_eq!(seq, screen.seq());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
