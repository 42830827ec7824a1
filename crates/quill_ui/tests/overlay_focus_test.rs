//! # Overlay, Focus and Liveness Tests
//!
//! Whole frames driven through a headless `CommandBuffer`:
//! - Tab order, focus traps and Escape
//! - Overlay dismissal after the settle frames
//! - Persistent menus block only their own rect
//! - Engine and caller state expire with their widgets
//! - Config loading and memory sizing
//! - Clipboard text is pasted whole or not at all

use quill_core::{AlignedBlock, StateRegistry};
use quill_ui::{
    AccessEventKind, AccessibilityLog, Backends, Capabilities, Clipboard, CloseReason,
    CommandBuffer, ConfigError, Context, ContextConfig, EditState, InitError, InputState, Key,
    MemoryClipboard, Modifiers, MouseButton, OverlayPhase, OverlayState, Rect, TextBuffer,
    WidgetId,
};

const SCREEN: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);
const DT: f32 = 1.0 / 60.0;

const FIRST: Rect = Rect::new(10.0, 10.0, 100.0, 30.0);
const SECOND: Rect = Rect::new(10.0, 50.0, 100.0, 30.0);
const DIALOG: Rect = Rect::new(200.0, 150.0, 400.0, 300.0);

fn block() -> AlignedBlock {
    AlignedBlock::new(Context::<CommandBuffer>::memory_footprint(
        &ContextConfig::default().limits,
    ))
}

fn context_with(block: &mut AlignedBlock, backends: Backends) -> Context<'_, CommandBuffer> {
    let config = ContextConfig::default();
    Context::new(config, &mut block.arena(), CommandBuffer::new(), backends).unwrap()
}

fn context(block: &mut AlignedBlock) -> Context<'_, CommandBuffer> {
    context_with(block, Backends::none())
}

fn press_at(x: f32, y: f32) -> InputState {
    let mut input = InputState::new();
    input.set_mouse_pos(x, y);
    input.mouse_button_down(MouseButton::Left);
    input
}

fn release_at(x: f32, y: f32) -> InputState {
    let mut input = InputState::new();
    input.set_mouse_pos(x, y);
    input.mouse_button_up(MouseButton::Left);
    input
}

fn key(key: Key, modifiers: Modifiers) -> InputState {
    let mut input = InputState::new();
    input.key_down(key);
    input.set_modifiers(modifiers);
    input
}

/// Two background buttons and, when open, a dialog with two more.
/// Returns the ids of every declared button.
fn declare(
    ctx: &mut Context<'_, CommandBuffer>,
    input: &InputState,
    dialog: &mut OverlayState,
) -> [WidgetId; 4] {
    ctx.begin_frame(input, DT, SCREEN);
    let first = ctx.button("First", FIRST).id;
    let second = ctx.button("Second", SECOND).id;
    let mut ok = WidgetId::NONE;
    let mut cancel = WidgetId::NONE;
    if let Some(mut overlay) = ctx.overlay_begin("Confirm", dialog, DIALOG, 10) {
        let content = overlay.content();
        let row = Rect::new(content.x, content.y, 120.0, 32.0);
        ok = overlay.button("OK", row).id;
        cancel = overlay
            .button("Cancel", Rect::new(row.right() + 8.0, row.y, 120.0, 32.0))
            .id;
    }
    ctx.end_frame();
    [first, second, ok, cancel]
}

// =============================================================================
// Focus
// =============================================================================

/// Test: Tab walks background widgets in declaration order and wraps
#[test]
fn test_tab_cycles_background() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut dialog = OverlayState::transient();
    let [first, second, ..] = declare(&mut ctx, &InputState::new(), &mut dialog);

    let tab = key(Key::Tab, Modifiers::NONE);
    declare(&mut ctx, &tab, &mut dialog);
    assert_eq!(ctx.focused(), first);
    declare(&mut ctx, &tab, &mut dialog);
    assert_eq!(ctx.focused(), second);
    declare(&mut ctx, &tab, &mut dialog);
    assert_eq!(ctx.focused(), first);

    declare(&mut ctx, &key(Key::Tab, Modifiers::SHIFT), &mut dialog);
    assert_eq!(ctx.focused(), second);
}

/// Test: an open dialog traps Tab inside itself
#[test]
fn test_dialog_traps_tab() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut dialog = OverlayState::transient();
    dialog.show();
    let [first, second, ok, cancel] = declare(&mut ctx, &InputState::new(), &mut dialog);
    assert!(!ok.is_none());

    let tab = key(Key::Tab, Modifiers::NONE);
    for expected in [ok, cancel, ok, cancel] {
        declare(&mut ctx, &tab, &mut dialog);
        assert_eq!(ctx.focused(), expected);
        assert_ne!(ctx.focused(), first);
        assert_ne!(ctx.focused(), second);
    }
}

/// Test: Escape closes the trapping dialog
#[test]
fn test_escape_closes_dialog() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut dialog = OverlayState::transient();
    dialog.show();
    declare(&mut ctx, &InputState::new(), &mut dialog);
    assert!(dialog.is_open());

    let [.., ok, _] = declare(&mut ctx, &key(Key::Escape, Modifiers::NONE), &mut dialog);
    assert!(ok.is_none(), "closed dialog declares nothing");
    assert!(!dialog.is_open());
    assert_eq!(dialog.take_close_reason(), Some(CloseReason::Escape));
}

/// Test: Escape without an overlay clears focus
#[test]
fn test_escape_clears_focus() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut dialog = OverlayState::transient();
    let [first, ..] = declare(&mut ctx, &press_at(20.0, 20.0), &mut dialog);
    assert_eq!(ctx.focused(), first);
    declare(&mut ctx, &release_at(20.0, 20.0), &mut dialog);
    assert_eq!(ctx.focused(), first);

    declare(&mut ctx, &key(Key::Escape, Modifiers::NONE), &mut dialog);
    assert!(ctx.focused().is_none());
}

/// Test: focus gained by Tab is announced once
#[test]
fn test_focus_announced_once() {
    let log = AccessibilityLog::new();
    let mut block = block();
    let mut ctx = context_with(&mut block, Backends::none().with_accessibility(log.clone()));
    let mut dialog = OverlayState::transient();
    declare(&mut ctx, &InputState::new(), &mut dialog);
    declare(&mut ctx, &key(Key::Tab, Modifiers::NONE), &mut dialog);
    let _ = log.drain();

    declare(&mut ctx, &InputState::new(), &mut dialog);
    declare(&mut ctx, &InputState::new(), &mut dialog);
    let focus_events = log
        .drain()
        .into_iter()
        .filter(|event| event.kind == AccessEventKind::Focus)
        .count();
    assert_eq!(focus_events, 1);
}

/// Two buttons on an input layer above one background button.
fn declare_layered(
    ctx: &mut Context<'_, CommandBuffer>,
    input: &InputState,
    trap: bool,
) -> [WidgetId; 3] {
    ctx.begin_frame(input, DT, SCREEN);
    let background = ctx.button("Background", FIRST).id;
    let (a, b) = {
        let mut layer = ctx.layer_scope(30);
        if trap {
            let id = layer.id();
            layer.focus_trap_begin(id);
        }
        let a = layer.button("A", Rect::new(300.0, 10.0, 100.0, 30.0)).id;
        let b = layer.button("B", Rect::new(300.0, 50.0, 100.0, 30.0)).id;
        (a, b)
    };
    ctx.end_frame();
    [background, a, b]
}

/// Test: a trap begun once keeps Tab inside its layer until it is ended
#[test]
fn test_trap_outlives_the_frame_it_began_in() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let [background, a, b] = declare_layered(&mut ctx, &InputState::new(), true);

    let tab = key(Key::Tab, Modifiers::NONE);
    for expected in [a, b, a] {
        declare_layered(&mut ctx, &tab, false);
        assert_eq!(ctx.focused(), expected);
        assert_ne!(ctx.focused(), background);
    }

    ctx.focus_trap_end();
    declare_layered(&mut ctx, &tab, false);
    declare_layered(&mut ctx, &tab, false);
    assert_eq!(ctx.focused(), background);
}

// =============================================================================
// Overlays
// =============================================================================

/// Test: the click that opens a dialog cannot dismiss it
#[test]
fn test_outside_click_ignored_while_opening() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut dialog = OverlayState::transient();
    dialog.show();

    let [.., ok, _] = declare(&mut ctx, &press_at(20.0, 20.0), &mut dialog);
    assert!(!ok.is_none());
    assert_eq!(dialog.phase(), OverlayPhase::Open);
}

/// Test: a settled dialog closes on an outside click, not an inside one
#[test]
fn test_outside_click_dismisses_after_settle() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut dialog = OverlayState::transient();
    dialog.show();
    declare(&mut ctx, &InputState::new(), &mut dialog);

    let (cx, cy) = DIALOG.center();
    declare(&mut ctx, &press_at(cx, cy), &mut dialog);
    declare(&mut ctx, &release_at(cx, cy), &mut dialog);
    assert!(dialog.is_open());

    declare(&mut ctx, &press_at(20.0, 20.0), &mut dialog);
    assert!(!dialog.is_open());
    assert_eq!(dialog.take_close_reason(), Some(CloseReason::OutsideClick));
}

/// Test: settle frames come from the timing config
#[test]
fn test_settle_frames_configurable() {
    let mut config = ContextConfig::default();
    config.timing.overlay_settle_frames = 3;
    let mut block = AlignedBlock::new(Context::<CommandBuffer>::memory_footprint(&config.limits));
    let mut ctx =
        Context::new(config, &mut block.arena(), CommandBuffer::new(), Backends::none()).unwrap();
    let mut dialog = OverlayState::transient();
    dialog.show();

    for frame in 0..3 {
        assert_eq!(dialog.phase(), OverlayPhase::Opening, "frame {frame}");
        declare(&mut ctx, &press_at(20.0, 20.0), &mut dialog);
        assert!(dialog.is_open(), "frame {frame}");
    }
    assert_eq!(dialog.phase(), OverlayPhase::Open);
}

/// Test: a button inside a dialog confirms it
#[test]
fn test_dialog_button_confirms() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut dialog = OverlayState::transient();
    dialog.show();
    declare(&mut ctx, &InputState::new(), &mut dialog);

    let content = DIALOG.shrink(quill_ui::snap4(ctx.style.padding));
    let (x, y) = (content.x + 10.0, content.y + 10.0);
    for input in [press_at(x, y), release_at(x, y)] {
        ctx.begin_frame(&input, DT, SCREEN);
        if let Some(mut overlay) = ctx.overlay_begin("Confirm", &mut dialog, DIALOG, 10) {
            let content = overlay.content();
            if overlay
                .button("OK", Rect::new(content.x, content.y, 120.0, 32.0))
                .clicked
            {
                overlay.close(CloseReason::Confirmed);
            }
        }
        ctx.end_frame();
    }
    assert!(!dialog.is_open());
    assert_eq!(dialog.take_close_reason(), Some(CloseReason::Confirmed));
}

/// Test: a persistent menu blocks widgets under it, not beside it
#[test]
fn test_menu_blocks_only_its_rect() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut menu = OverlayState::persistent();
    menu.open();
    let menu_rect = Rect::new(0.0, 0.0, 200.0, 45.0);
    let under = Rect::new(10.0, 10.0, 100.0, 30.0);
    let beside = Rect::new(300.0, 10.0, 100.0, 30.0);

    let mut frame = |ctx: &mut Context<'_, CommandBuffer>, input: &InputState| {
        ctx.begin_frame(input, DT, SCREEN);
        let under = ctx.button("Under", under);
        let beside = ctx.button("Beside", beside);
        let _ = ctx.overlay_begin("Menu", &mut menu, menu_rect, 5);
        ctx.end_frame();
        (under, beside)
    };

    let (under_hit, _) = frame(&mut ctx, &press_at(20.0, 20.0));
    assert!(under_hit.pressed, "menu region is not in effect yet");
    frame(&mut ctx, &release_at(20.0, 20.0));

    let (_, beside_hit) = frame(&mut ctx, &press_at(310.0, 20.0));
    assert!(beside_hit.pressed);
    frame(&mut ctx, &release_at(310.0, 20.0));

    let (under_hit, _) = frame(&mut ctx, &press_at(20.0, 20.0));
    assert!(!under_hit.pressed);
    assert!(menu.is_open(), "menus ignore outside clicks by default");
}

/// Test: closing a menu leaves its region in effect for one frame
#[test]
fn test_closed_menu_blocks_one_more_frame() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut menu = OverlayState::persistent();
    menu.open();
    let menu_rect = Rect::new(0.0, 0.0, 200.0, 45.0);
    let under = Rect::new(10.0, 10.0, 100.0, 30.0);

    ctx.begin_frame(&InputState::new(), DT, SCREEN);
    let _ = ctx.overlay_begin("Menu", &mut menu, menu_rect, 5);
    ctx.end_frame();
    menu.toggle();

    ctx.begin_frame(&press_at(20.0, 20.0), DT, SCREEN);
    let blocked = ctx.button("Under", under);
    assert!(ctx.overlay_begin("Menu", &mut menu, menu_rect, 5).is_none());
    ctx.end_frame();
    assert!(!blocked.pressed);

    ctx.begin_frame(&release_at(20.0, 20.0), DT, SCREEN);
    ctx.button("Under", under);
    ctx.end_frame();

    ctx.begin_frame(&press_at(20.0, 20.0), DT, SCREEN);
    let open = ctx.button("Under", under);
    ctx.end_frame();
    assert!(open.pressed);
}

/// Test: a region left by a closed menu still blocks a different overlay
/// declared in its place the next frame
#[test]
fn test_stale_region_blocks_replacement_overlay() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut upper = OverlayState::persistent();
    let mut lower = OverlayState::persistent();
    let upper_rect = Rect::new(100.0, 100.0, 200.0, 200.0);
    let lower_rect = Rect::new(150.0, 150.0, 200.0, 200.0);
    let item = Rect::new(170.0, 170.0, 60.0, 30.0);
    upper.open();

    ctx.begin_frame(&InputState::new(), DT, SCREEN);
    let _ = ctx.overlay_begin("Upper", &mut upper, upper_rect, 20);
    ctx.end_frame();
    upper.toggle();
    lower.open();

    let mut frame = |ctx: &mut Context<'_, CommandBuffer>, input: &InputState| {
        ctx.begin_frame(input, DT, SCREEN);
        let _ = ctx.overlay_begin("Upper", &mut upper, upper_rect, 20);
        let hit = ctx
            .overlay_begin("Lower", &mut lower, lower_rect, 10)
            .map(|mut overlay| overlay.button("Item", item));
        ctx.end_frame();
        hit
    };

    let blocked = frame(&mut ctx, &press_at(180.0, 180.0)).unwrap();
    assert!(!blocked.pressed, "upper's region is still in effect");
    frame(&mut ctx, &release_at(180.0, 180.0));

    let open = frame(&mut ctx, &press_at(180.0, 180.0)).unwrap();
    assert!(open.pressed);
}

// =============================================================================
// Liveness
// =============================================================================

/// Test: focus is dropped when its widget stops being declared
#[test]
fn test_hidden_field_loses_focus() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut buffer = TextBuffer::with_capacity(32);
    let mut state = EditState::default();
    let rect = Rect::new(10.0, 10.0, 200.0, 32.0);

    ctx.begin_frame(&press_at(20.0, 20.0), DT, SCREEN);
    let field = ctx.text_field("Name", &mut buffer, &mut state, rect);
    ctx.end_frame();
    assert!(field.focused);

    ctx.begin_frame(&release_at(20.0, 20.0), DT, SCREEN);
    ctx.end_frame();
    assert!(ctx.focused().is_none());

    let mut typed = InputState::new();
    typed.char_input('x');
    ctx.begin_frame(&typed, DT, SCREEN);
    let field = ctx.text_field("Name", &mut buffer, &mut state, rect);
    ctx.end_frame();
    assert!(!field.focused);
    assert!(buffer.is_empty());
}

/// Test: caller registries drop entries for undeclared widgets
#[test]
fn test_registry_expires_undeclared() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut states: StateRegistry<EditState> = StateRegistry::new(8);
    let mut buffer = TextBuffer::with_capacity(16);

    let mut run = |ctx: &mut Context<'_, CommandBuffer>, labels: &[&str]| {
        ctx.begin_frame(&InputState::new(), DT, SCREEN);
        for (i, label) in labels.iter().enumerate() {
            let id = ctx.make_id(label);
            let frame = ctx.frame();
            let state = states
                .get_or_insert_with(id.raw(), frame, EditState::default)
                .unwrap();
            let y = 10.0 + 40.0 * i as f32;
            ctx.text_field(label, &mut buffer, state, Rect::new(10.0, y, 200.0, 32.0));
        }
        ctx.end_frame();
        ctx.expire_unseen(&mut states)
    };

    assert_eq!(run(&mut ctx, &["Host", "Port"]), 0);
    assert_eq!(run(&mut ctx, &["Host"]), 1);
    assert_eq!(run(&mut ctx, &["Host"]), 0);

    assert_eq!(states.len(), 1);
    assert!(states.get(ctx.make_id("Port").raw()).is_none());
    assert!(states.get(ctx.make_id("Host").raw()).is_some());
}

/// Test: identities seen last frame are reported as such
#[test]
fn test_seen_last_frame() {
    let mut block = block();
    let mut ctx = context(&mut block);
    let mut dialog = OverlayState::transient();
    let [first, ..] = declare(&mut ctx, &InputState::new(), &mut dialog);
    assert!(ctx.was_seen_last_frame(first));

    ctx.begin_frame(&InputState::new(), DT, SCREEN);
    ctx.end_frame();
    assert!(!ctx.was_seen_last_frame(first));
}

// =============================================================================
// Config and sizing
// =============================================================================

/// Test: partial TOML keeps defaults for the rest
#[test]
fn test_config_from_toml() {
    let config = ContextConfig::from_toml_str(
        r"
        [limits]
        max_focusable = 64

        [timing]
        overlay_settle_frames = 2
        ",
    )
    .unwrap();
    assert_eq!(config.limits.max_focusable, 64);
    assert_eq!(config.limits.max_windows, 16);
    assert_eq!(config.timing.overlay_settle_frames, 2);
    assert!((config.timing.double_click_time - 0.4).abs() < f64::EPSILON);
}

/// Test: malformed TOML is a parse error
#[test]
fn test_config_parse_error() {
    let result = ContextConfig::from_toml_str("[limits\nmax_focusable = ");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

/// Test: the footprint is exactly what the context needs
#[test]
fn test_memory_footprint_is_exact() {
    let config = ContextConfig::default();
    let footprint = Context::<CommandBuffer>::memory_footprint(&config.limits);

    let mut exact = AlignedBlock::new(footprint);
    let mut arena = exact.arena();
    assert!(Context::new(config, &mut arena, CommandBuffer::new(), Backends::none()).is_ok());
    assert_eq!(arena.remaining(), 0);

    let mut short = AlignedBlock::new(footprint - 1);
    let result = Context::new(config, &mut short.arena(), CommandBuffer::new(), Backends::none());
    assert!(matches!(result, Err(InitError::InsufficientMemory { .. })));
}

/// Test: limits too large for the address space are reported, not wrapped
#[test]
fn test_oversized_limits_report_insufficient_memory() {
    let mut config = ContextConfig::default();
    config.limits.max_live_ids = usize::MAX / 2;
    assert_eq!(Context::<CommandBuffer>::memory_footprint(&config.limits), usize::MAX);
    assert!(matches!(
        Context::<CommandBuffer>::validate(&config, usize::MAX, Capabilities::NONE, false),
        Err(InitError::InsufficientMemory { .. })
    ));

    let mut block = block();
    let result = Context::new(config, &mut block.arena(), CommandBuffer::new(), Backends::none());
    assert!(matches!(result, Err(InitError::InsufficientMemory { .. })));
}

/// Test: larger limits need more memory
#[test]
fn test_footprint_grows_with_limits() {
    let small = ContextConfig::default().limits;
    let mut large = small;
    large.max_focusable *= 4;
    large.max_live_ids *= 4;
    assert!(
        Context::<CommandBuffer>::memory_footprint(&large)
            > Context::<CommandBuffer>::memory_footprint(&small)
    );
}

/// Test: validate reports what new would reject
#[test]
fn test_validate_matches_new() {
    let config = ContextConfig::default();
    let footprint = Context::<CommandBuffer>::memory_footprint(&config.limits);

    assert!(
        Context::<CommandBuffer>::validate(&config, footprint, Capabilities::NONE, false).is_ok()
    );
    assert!(matches!(
        Context::<CommandBuffer>::validate(&config, footprint - 1, Capabilities::NONE, false),
        Err(InitError::InsufficientMemory { required, available })
            if required == footprint && available == footprint - 1
    ));
    assert!(matches!(
        Context::<CommandBuffer>::validate(&config, footprint, Capabilities::TEXT, true),
        Err(InitError::ConflictingTextBackends)
    ));
    assert!(matches!(
        Context::<CommandBuffer>::validate(&config, footprint, Capabilities::NONE, true),
        Err(InitError::MissingPathSupport)
    ));

    let mut zero = config;
    zero.limits.max_layers = 0;
    assert!(matches!(
        Context::<CommandBuffer>::validate(&zero, usize::MAX, Capabilities::NONE, false),
        Err(InitError::InvalidLimits { field: "max_layers" })
    ));
}

// =============================================================================
// Clipboard
// =============================================================================

/// Focuses the field at `rect`, then presses Ctrl+V over it.
fn paste_into(
    ctx: &mut Context<'_, CommandBuffer>,
    buffer: &mut TextBuffer,
    state: &mut EditState,
) -> bool {
    let rect = Rect::new(10.0, 10.0, 200.0, 32.0);
    for input in [press_at(20.0, 20.0), release_at(20.0, 20.0)] {
        ctx.begin_frame(&input, DT, SCREEN);
        ctx.text_field("Notes", buffer, state, rect);
        ctx.end_frame();
    }
    ctx.begin_frame(&key(Key::V, Modifiers::CTRL), DT, SCREEN);
    let response = ctx.text_field("Notes", buffer, state, rect);
    ctx.end_frame();
    assert!(response.focused);
    response.changed
}

/// Test: text longer than any fixed read size is pasted in full
#[test]
fn test_long_clipboard_text_pastes_whole() {
    let clipboard = MemoryClipboard::new();
    let mut host = clipboard.clone();
    host.set_text(&"a".repeat(2000));
    let mut block = block();
    let mut ctx = context_with(&mut block, Backends::none().with_clipboard(clipboard));
    let mut buffer = TextBuffer::with_capacity(4096);
    let mut state = EditState::default();

    assert!(paste_into(&mut ctx, &mut buffer, &mut state));
    assert_eq!(buffer.len(), 2000);
    assert_eq!(state.cursor, 2000);
}

/// Test: clipboard text that does not fit leaves the field untouched
#[test]
fn test_oversized_clipboard_text_is_dropped() {
    let clipboard = MemoryClipboard::new();
    let mut host = clipboard.clone();
    host.set_text(&"a".repeat(2000));
    let mut block = block();
    let mut ctx = context_with(&mut block, Backends::none().with_clipboard(clipboard));
    let mut buffer = TextBuffer::from_text(1024, "draft").unwrap();
    let mut state = EditState::default();

    assert!(!paste_into(&mut ctx, &mut buffer, &mut state));
    assert_eq!(buffer.as_str(), "draft");
}
