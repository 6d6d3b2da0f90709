//! The example page and its tabs.
//!
//! Handlers never touch the page directly; they push navigation requests
//! onto the session outbox, and the driver loop in `main` applies them
//! after each routed event. That keeps handlers free of reentrant page
//! mutation while preserving the "button switches the tab" behavior.

use std::sync::{Arc, Mutex};

use tracing::info;

use remui::prelude::*;

/// What a handler may ask the page loop to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nav {
    /// Swap the primary element to the given tab.
    Tab(u8),
}

/// Host session for one connected player.
#[derive(Debug)]
pub struct DemoSession {
    pub player: String,
    outbox: Mutex<Vec<Nav>>,
}

impl DemoSession {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            outbox: Mutex::new(Vec::new()),
        }
    }

    /// Queue a navigation request for the page loop.
    pub fn request(&self, nav: Nav) {
        self.outbox.lock().expect("outbox poisoned").push(nav);
    }

    /// Take everything queued since the last drain.
    pub fn drain(&self) -> Vec<Nav> {
        std::mem::take(&mut self.outbox.lock().expect("outbox poisoned"))
    }
}

// =============================================================================
// Iterated list item with a bound index field
// =============================================================================

struct IteratedElement {
    support: EventSupport<DemoSession>,
    index: usize,
    element_index: Bindable<String>,
}

impl IteratedElement {
    fn new(support: EventSupport<DemoSession>, index: usize) -> Self {
        let element_index = support.bindings().bind("elementIndex", "#ElementIndex");
        Self {
            support,
            index,
            element_index,
        }
    }
}

impl Element<DemoSession> for IteratedElement {
    fn selector_id(&self) -> &str {
        "IteratedElement"
    }

    fn support_mut(&mut self) -> &mut EventSupport<DemoSession> {
        &mut self.support
    }

    fn on_create(&mut self, root: &str, patches: &mut PatchList, _events: &mut EventDeclList) {
        patches.append(root, "Example/IteratedElement.ui");
        self.element_index.set_in(self.index.to_string(), patches);
    }
}

// =============================================================================
// Tab 1: a list of iterated elements
// =============================================================================

pub struct Tab1 {
    support: EventSupport<DemoSession>,
    router: Arc<EventRouter<DemoSession>>,
    sink: Arc<dyn UpdateSink>,
    children: Vec<IteratedElement>,
}

impl Tab1 {
    pub fn new(page: &PageDriver<DemoSession>) -> Self {
        Self {
            support: page.new_support(),
            router: page.router(),
            sink: page.sink(),
            children: Vec::new(),
        }
    }
}

impl Element<DemoSession> for Tab1 {
    fn selector_id(&self) -> &str {
        "Tab1"
    }

    fn support_mut(&mut self) -> &mut EventSupport<DemoSession> {
        &mut self.support
    }

    fn on_create(&mut self, root: &str, patches: &mut PatchList, events: &mut EventDeclList) {
        patches.append(root, "Example/Tab1.ui");

        for i in 0..10 {
            let support = EventSupport::new(Arc::clone(&self.router), Arc::clone(&self.sink));
            let mut child = IteratedElement::new(support, i);
            create_indexed(&mut child, "#IteratedList", i, patches, events);
            self.children.push(child);
        }
    }
}

// =============================================================================
// Tab 2: the scoreboard
// =============================================================================

pub struct Tab2 {
    support: EventSupport<DemoSession>,
    score: Bindable<i64>,
}

impl Tab2 {
    pub fn new(page: &PageDriver<DemoSession>) -> Self {
        let support = page.new_support();
        let score = support.bindings().bind("score", "#Score");
        Self { support, score }
    }
}

impl Element<DemoSession> for Tab2 {
    fn selector_id(&self) -> &str {
        "Tab2"
    }

    fn support_mut(&mut self) -> &mut EventSupport<DemoSession> {
        &mut self.support
    }

    fn on_create(&mut self, root: &str, patches: &mut PatchList, events: &mut EventDeclList) {
        patches.append(root, "Example/Tab2.ui");
        self.score.set_in(0, patches);

        // A click mutates the bound cell; the cell notifies the binding
        // manager; the manager patches "#Score" on the client.
        let score = self.score.clone();
        self.support.declare_event(
            InteractionKind::Activating,
            "#ScoreBtn",
            EventSpec::action("tab-2-btn-clicked").on_event(move |_| {
                let next = score.get().unwrap_or(0) + 1;
                score.set(next);
            }),
            events,
        );

        self.support.declare_event(
            InteractionKind::Activating,
            "#NextBtn",
            EventSpec::action("tab-2-next-clicked")
                .on_event(|ctx: &EventContext<'_, DemoSession>| ctx.session().request(Nav::Tab(3))),
            events,
        );
    }
}

// =============================================================================
// Tab 3: navigation back
// =============================================================================

pub struct Tab3 {
    support: EventSupport<DemoSession>,
}

impl Tab3 {
    pub fn new(page: &PageDriver<DemoSession>) -> Self {
        Self {
            support: page.new_support(),
        }
    }
}

impl Element<DemoSession> for Tab3 {
    fn selector_id(&self) -> &str {
        "Tab3"
    }

    fn support_mut(&mut self) -> &mut EventSupport<DemoSession> {
        &mut self.support
    }

    fn on_create(&mut self, root: &str, patches: &mut PatchList, events: &mut EventDeclList) {
        patches.append(root, "Example/Tab3.ui");
        self.support.declare_event(
            InteractionKind::Activating,
            "#BackBtn",
            EventSpec::action("tab-3-back-btn-clicked")
                .on_event(|ctx: &EventContext<'_, DemoSession>| ctx.session().request(Nav::Tab(2))),
            events,
        );
    }
}

// =============================================================================
// Tab 4: a handler that talks back to the player
// =============================================================================

pub struct Tab4 {
    support: EventSupport<DemoSession>,
    sink: Arc<dyn UpdateSink>,
}

impl Tab4 {
    pub fn new(page: &PageDriver<DemoSession>) -> Self {
        Self {
            support: page.new_support(),
            sink: page.sink(),
        }
    }
}

impl Element<DemoSession> for Tab4 {
    fn selector_id(&self) -> &str {
        "Tab4"
    }

    fn support_mut(&mut self) -> &mut EventSupport<DemoSession> {
        &mut self.support
    }

    fn on_create(&mut self, root: &str, patches: &mut PatchList, events: &mut EventDeclList) {
        patches.append(root, "Example/Tab4.ui");

        let sink = Arc::clone(&self.sink);
        self.support.declare_event(
            InteractionKind::Activating,
            "#BackBtn",
            EventSpec::action("tab-4-back-btn-clicked").on_event(move |ctx: &EventContext<'_, DemoSession>| {
                info!(player = %ctx.session().player, "message: we're supposed to go back now!");
                sink.send_update(PatchList::new(), EventDeclList::new(), false);
            }),
            events,
        );
    }
}

// =============================================================================
// The page
// =============================================================================

pub struct ExamplePage {
    driver: PageDriver<DemoSession>,
    status: Bindable<String>,
}

impl ExamplePage {
    /// Build the page shell, declare the tab strip, and show tab 1.
    pub fn new(sink: Arc<dyn UpdateSink>) -> Self {
        let mut driver = PageDriver::new(sink);
        let status = driver.bindings().bind("status", "#Status");

        let mut patches = PatchList::new();
        patches.append("", "Example/ExamplePage.ui");
        let mut events = EventDeclList::new();
        for (n, tab_selector) in [(1u8, "#Tab1Button"), (2, "#Tab2Button"), (4, "#Tab4Button")] {
            driver.support_mut().declare_event(
                InteractionKind::Activating,
                tab_selector,
                EventSpec::action(format!("tab-{n}-selected"))
                    .on_event(move |ctx: &EventContext<'_, DemoSession>| ctx.session().request(Nav::Tab(n))),
                &mut events,
            );
        }
        driver.send_update(patches, events, true);

        let mut page = Self { driver, status };
        page.show_tab(1);
        page
    }

    /// Swap the primary element to the requested tab.
    pub fn show_tab(&mut self, n: u8) {
        let element: Box<dyn Element<DemoSession>> = match n {
            2 => Box::new(Tab2::new(&self.driver)),
            3 => Box::new(Tab3::new(&self.driver)),
            4 => Box::new(Tab4::new(&self.driver)),
            _ => Box::new(Tab1::new(&self.driver)),
        };
        self.driver.show_primary(element);
        self.status.set(format!("Viewing tab {n}"));
    }

    /// Feed one raw client payload through decode → route, then apply any
    /// navigation the handlers queued.
    pub fn handle_client_payload(&mut self, session: &DemoSession, raw: &str) {
        match self.driver.handle_data_event(session, raw) {
            Ok(outcome) => {
                if !outcome.is_handled() {
                    info!(player = %session.player, "event not handled; client should re-sync");
                }
            }
            Err(err) => {
                info!(player = %session.player, %err, "rejected malformed payload");
            }
        }

        for nav in session.drain() {
            match nav {
                Nav::Tab(n) => self.show_tab(n),
            }
        }
    }
}
