//! 脚本化的假桌面
//!
//! 记录所有输入事件，并按脚本模拟扩展界面：提交搜索后经过
//! `ready_after` 内容才可复制，浮层只在指定坐标被点中时打开。

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::Instant;

use kinic_driver_lib::automation::AutomationContext;
use kinic_driver_lib::input::{
    ClipboardBridge, Desktop, FocusManager, InputError, InputInjector, InputResult, KeyStroke,
    ScreenPoint, WindowInfo,
};
use kinic_driver_lib::state::config::AppConfig;
use kinic_driver_lib::state::{CoordinateStore, PointLabel};

pub const BUTTON: ScreenPoint = ScreenPoint { x: 962, y: 84 };
pub const RESPONSE: ScreenPoint = ScreenPoint { x: 700, y: 520 };

pub const HOST_WINDOW_ID: u32 = 1;
pub const OVERLAY_WINDOW_ID: u32 = 2;
pub const OTHER_WINDOW_ID: u32 = 3;

pub const ANSWER: &str = "Ownership gives every value exactly one owner at a time.";
pub const RESULT_URL: &str = "https://doc.rust-lang.org/book/ch04-01-what-is-ownership.html";

/// 假桌面上发生的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Focus,
    Click(ScreenPoint),
    MultiClick(ScreenPoint),
    Drag(ScreenPoint, ScreenPoint),
    Key(KeyStroke),
    Type(String),
    ClipboardWrite(String),
    ClipboardClear,
}

impl Event {
    /// 是否是输入注入
    pub fn is_injection(&self) -> bool {
        matches!(
            self,
            Self::Click(_) | Self::MultiClick(_) | Self::Drag(..) | Self::Key(_) | Self::Type(_)
        )
    }
}

/// 屏幕脚本与事件记录
pub struct Screen {
    pub events: Vec<Event>,
    pub clipboard: Option<String>,
    /// 内容就绪后复制得到的文本，`None` 表示复制静默失败
    pub answer: Option<String>,
    /// 从提交搜索到内容可复制的时间
    pub ready_after: Duration,
    /// 优先于 `answer` 的逐次复制结果
    pub copy_script: VecDeque<Option<String>>,
    pub focus_fails: bool,
    /// 切换请求后仍停在其他窗口的次数
    pub focus_lag: u32,
    /// 按键在成功前失败的次数
    pub key_failures: HashMap<KeyStroke, u32>,
    /// 按键成功若干次后一直失败
    pub key_fail_after: HashMap<KeyStroke, u32>,
    pub clipboard_broken: bool,
    /// 剪贴板读取在成功前失败的次数
    pub read_failures: u32,
    /// 能打开浮层的点击坐标，`None` 表示任意坐标
    pub overlay_points: Option<Vec<ScreenPoint>>,
    pub foreground: u32,
    pub typed: bool,
    /// 第一次提交搜索的时间
    pub submitted_at: Option<Instant>,
    pub menu_open: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            clipboard: None,
            answer: None,
            ready_after: Duration::ZERO,
            copy_script: VecDeque::new(),
            focus_fails: false,
            focus_lag: 0,
            key_failures: HashMap::new(),
            key_fail_after: HashMap::new(),
            clipboard_broken: false,
            read_failures: 0,
            overlay_points: None,
            foreground: HOST_WINDOW_ID,
            typed: false,
            submitted_at: None,
            menu_open: false,
        }
    }
}

impl Screen {
    /// 复制立即可用
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            ..Default::default()
        }
    }

    pub fn with_clipboard(mut self, text: &str) -> Self {
        self.clipboard = Some(text.to_string());
        self
    }

    pub fn ready_after(mut self, delay: Duration) -> Self {
        self.ready_after = delay;
        self
    }

    pub fn fail_key(mut self, stroke: KeyStroke, times: u32) -> Self {
        self.key_failures.insert(stroke, times);
        self
    }

    pub fn fail_key_after(mut self, stroke: KeyStroke, successes: u32) -> Self {
        self.key_fail_after.insert(stroke, successes);
        self
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }

    pub fn injections(&self) -> Vec<Event> {
        self.events.iter().filter(|e| e.is_injection()).cloned().collect()
    }

    pub fn clicks(&self) -> Vec<ScreenPoint> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Click(point) => Some(*point),
                _ => None,
            })
            .collect()
    }

    pub fn typed_texts(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Type(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn copy(&mut self) {
        let copied = match self.copy_script.pop_front() {
            Some(scripted) => scripted,
            None => match self.submitted_at {
                Some(at) if at.elapsed() >= self.ready_after => self.answer.clone(),
                _ => None,
            },
        };

        if let Some(text) = copied {
            self.clipboard = Some(text);
        }
    }

    fn host_window(&self) -> WindowInfo {
        self.window(HOST_WINDOW_ID)
    }

    fn window(&self, window_id: u32) -> WindowInfo {
        WindowInfo {
            app_name: "Google Chrome".to_string(),
            title: "Kinic".to_string(),
            process_id: 4242,
            exec_name: "chrome".to_string(),
            window_id,
        }
    }
}

/// 假桌面
pub struct FakeDesktop {
    screen: Rc<RefCell<Screen>>,
}

impl FakeDesktop {
    pub fn new(screen: Screen) -> (Self, Rc<RefCell<Screen>>) {
        let screen = Rc::new(RefCell::new(screen));
        (
            Self {
                screen: Rc::clone(&screen),
            },
            screen,
        )
    }
}

impl InputInjector for FakeDesktop {
    fn click(&mut self, point: ScreenPoint) -> InputResult<()> {
        let mut screen = self.screen.borrow_mut();
        screen.events.push(Event::Click(point));

        let opens = match &screen.overlay_points {
            None => true,
            Some(points) => points.contains(&point),
        };
        if opens {
            screen.foreground = OVERLAY_WINDOW_ID;
        }
        Ok(())
    }

    fn multi_click(&mut self, point: ScreenPoint, _count: u32, _interval: Duration) -> InputResult<()> {
        self.screen.borrow_mut().events.push(Event::MultiClick(point));
        Ok(())
    }

    fn drag(&mut self, from: ScreenPoint, to: ScreenPoint) -> InputResult<()> {
        self.screen.borrow_mut().events.push(Event::Drag(from, to));
        Ok(())
    }

    fn key(&mut self, stroke: KeyStroke) -> InputResult<()> {
        let mut screen = self.screen.borrow_mut();

        if let Some(remaining) = screen.key_failures.get_mut(&stroke)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(InputError::KeyboardSimulationFailed(format!(
                "scripted failure for {}",
                stroke.name()
            )));
        }

        if let Some(successes) = screen.key_fail_after.get_mut(&stroke) {
            if *successes == 0 {
                return Err(InputError::KeyboardSimulationFailed(format!(
                    "{} is stuck",
                    stroke.name()
                )));
            }
            *successes -= 1;
        }

        screen.events.push(Event::Key(stroke));

        match stroke {
            KeyStroke::Escape => {
                screen.menu_open = false;
                screen.foreground = HOST_WINDOW_ID;
            }
            KeyStroke::ContextMenu => screen.menu_open = true,
            KeyStroke::Enter if screen.menu_open => {
                screen.menu_open = false;
                screen.copy();
            }
            KeyStroke::Enter if screen.typed && screen.submitted_at.is_none() => {
                screen.submitted_at = Some(Instant::now());
            }
            KeyStroke::Copy => screen.copy(),
            _ => {}
        }

        Ok(())
    }

    fn type_text(&mut self, text: &str) -> InputResult<()> {
        let mut screen = self.screen.borrow_mut();
        screen.events.push(Event::Type(text.to_string()));
        screen.typed = true;
        Ok(())
    }
}

impl ClipboardBridge for FakeDesktop {
    fn read_text(&mut self) -> InputResult<Option<String>> {
        let mut screen = self.screen.borrow_mut();
        if screen.clipboard_broken {
            return Err(InputError::ClipboardFailed("clipboard locked".to_string()));
        }
        if screen.read_failures > 0 {
            screen.read_failures -= 1;
            return Err(InputError::ClipboardFailed("clipboard busy".to_string()));
        }
        Ok(screen.clipboard.clone())
    }

    fn write_text(&mut self, text: &str) -> InputResult<()> {
        let mut screen = self.screen.borrow_mut();
        screen.events.push(Event::ClipboardWrite(text.to_string()));
        screen.clipboard = Some(text.to_string());
        Ok(())
    }

    fn clear(&mut self) -> InputResult<()> {
        let mut screen = self.screen.borrow_mut();
        if screen.clipboard_broken {
            return Err(InputError::ClipboardFailed("clipboard locked".to_string()));
        }
        screen.events.push(Event::ClipboardClear);
        screen.clipboard = None;
        Ok(())
    }
}

impl FocusManager for FakeDesktop {
    fn request_focus(&mut self) -> InputResult<WindowInfo> {
        let mut screen = self.screen.borrow_mut();
        if screen.focus_fails {
            return Err(InputError::TargetWindowNotFound("chrome".to_string()));
        }
        screen.events.push(Event::Focus);
        if screen.focus_lag > 0 {
            screen.focus_lag -= 1;
            screen.foreground = OTHER_WINDOW_ID;
        } else {
            screen.foreground = HOST_WINDOW_ID;
        }
        Ok(screen.host_window())
    }

    fn foreground(&mut self) -> InputResult<Option<WindowInfo>> {
        let screen = self.screen.borrow();
        Ok(Some(screen.window(screen.foreground)))
    }
}

impl Desktop for FakeDesktop {
    fn injector(&mut self) -> &mut dyn InputInjector {
        self
    }

    fn clipboard(&mut self) -> &mut dyn ClipboardBridge {
        self
    }

    fn focus(&mut self) -> &mut dyn FocusManager {
        self
    }
}

/// 上下文、屏幕和坐标目录
pub struct Harness {
    pub context: AutomationContext<FakeDesktop>,
    pub screen: Rc<RefCell<Screen>>,
    pub dir: TempDir,
}

impl Harness {
    /// 两个坐标都已校准
    pub fn new(settings: AppConfig, screen: Screen) -> Self {
        Self::build(settings, screen, true)
    }

    /// 没有任何坐标
    pub fn uncalibrated(settings: AppConfig, screen: Screen) -> Self {
        Self::build(settings, screen, false)
    }

    fn build(settings: AppConfig, screen: Screen, calibrated: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = CoordinateStore::open(dir.path().join("coordinates.json"), None).unwrap();

        if calibrated {
            store.update(PointLabel::Button, BUTTON.x, BUTTON.y).unwrap();
            store.update(PointLabel::ResponseArea, RESPONSE.x, RESPONSE.y).unwrap();
        }

        let (desktop, screen) = FakeDesktop::new(screen);
        let context = AutomationContext::new(settings, store, desktop);

        Self {
            context,
            screen,
            dir,
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.screen.borrow().events.clone()
    }

    pub fn fail_key_after(self, stroke: KeyStroke, successes: u32) -> Self {
        self.screen.borrow_mut().key_fail_after.insert(stroke, successes);
        self
    }

    pub fn count(&self, event: &Event) -> usize {
        self.screen.borrow().count(event)
    }

    pub fn injections(&self) -> Vec<Event> {
        self.screen.borrow().injections()
    }

    pub fn clipboard(&self) -> Option<String> {
        self.screen.borrow().clipboard.clone()
    }
}

/// 一次完整保存的事件序列
pub fn save_sequence() -> Vec<Event> {
    vec![
        Event::Focus,
        Event::Key(KeyStroke::Escape),
        Event::Click(BUTTON),
        Event::Key(KeyStroke::ShiftTab),
        Event::Key(KeyStroke::Enter),
        Event::Key(KeyStroke::Escape),
    ]
}
