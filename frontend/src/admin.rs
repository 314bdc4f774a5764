use futures::future::try_join3;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::capabilities::print_page;
use crate::error::LoginRedirect;
use crate::layout::DashboardLayout;
use crate::models::{Reports, Stats, UserRow};
use crate::session::use_session;
use crate::utils::{format_date, format_datetime, status_badge};
use crate::Route;

/* -------------------------------------------------------------------------- */
/*                              derived figures                               */
/* -------------------------------------------------------------------------- */

/// Share of queries the AI closed without a tutor, rounded like `Math.round`.
pub fn ai_resolution_percentage(stats: &Stats) -> i64 {
    if stats.total_queries == 0 {
        return 0;
    }
    let total = stats.total_queries as f64;
    let ratio = (total - stats.queries_escalated as f64) / total * 100.0;
    (ratio + 0.5).floor() as i64
}

pub fn escalation_rate(ai_percentage: i64) -> i64 {
    100 - ai_percentage
}

const LOAD_REDIRECT: LoginRedirect = LoginRedirect::OnForbidden;

#[derive(Clone, Copy, PartialEq, Debug)]
enum SystemStatus {
    Checking,
    Online,
    Offline,
}

impl SystemStatus {
    fn label(self) -> &'static str {
        match self {
            SystemStatus::Checking => "Checking...",
            SystemStatus::Online => "Online",
            SystemStatus::Offline => "Offline",
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum AdminTab {
    Overview,
    Reports,
    Users,
}

/* -------------------------------------------------------------------------- */
/*                              admin panel                                   */
/* -------------------------------------------------------------------------- */

#[function_component(AdminDashboard)]
pub fn admin_dashboard() -> Html {
    let navigator = use_navigator().unwrap();
    let session   = use_session();

    let stats   = use_state(|| None::<Stats>);
    let reports = use_state(|| None::<Reports>);
    let users   = use_state(Vec::<UserRow>::new);
    let status  = use_state(|| SystemStatus::Checking);
    let tab     = use_state(|| AdminTab::Overview);

    /* -------- three read endpoints, fetched together on mount -------- */
    {
        let api       = session.api();
        let stats     = stats.clone();
        let reports   = reports.clone();
        let users     = users.clone();
        let status    = status.clone();
        let navigator = navigator.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                let loaded = try_join3(
                    api.get::<Stats>("/admin/stats"),
                    api.get::<Reports>("/admin/reports"),
                    api.get::<Vec<UserRow>>("/admin/users"),
                )
                .await;

                match loaded {
                    Ok((s, r, u)) => {
                        log::info!("admin data: {} queries, {} users", s.total_queries, u.len());
                        stats.set(Some(s));
                        reports.set(Some(r));
                        users.set(u);
                        status.set(SystemStatus::Online);
                    }
                    Err(e) => {
                        log::error!("admin data: {e}");
                        status.set(SystemStatus::Offline);
                        if LOAD_REDIRECT.applies(&e) {
                            navigator.push(&Route::Login);
                        }
                    }
                }
            });
            || ()
        });
    }

    /* ---------------------------- rendering ------------------------------- */

    let online = *status == SystemStatus::Online;
    let subtitle = html! {
        <div class="status-line">
            <span class={classes!("system-status", if online { "online" } else { "offline" })}>
                <span class="status-dot"></span>
                { format!("System {}", status.label()) }
            </span>
            <span class="separator">{"|"}</span>
            <span class="muted">{ concat!("v", env!("CARGO_PKG_VERSION"), " (Stable)") }</span>
        </div>
    };

    let actions = html! {
        <button class="btn-primary btn-muted btn-auto" onclick={Callback::from(|_: MouseEvent| print_page())}>
            {"🖨️ Export PDF"}
        </button>
    };

    let tab_button = |t: AdminTab, label: &'static str| {
        let onclick = {
            let tab = tab.clone();
            Callback::from(move |_: MouseEvent| tab.set(t))
        };
        html! { <button class={classes!("tab-btn", (*tab == t).then_some("active"))} {onclick}>{ label }</button> }
    };

    let content = match *tab {
        AdminTab::Overview => match &*stats {
            Some(s) => overview(s),
            None => Html::default(),
        },
        AdminTab::Reports => match &*reports {
            Some(r) => detailed_reports(r),
            None => Html::default(),
        },
        AdminTab::Users => user_table(&users),
    };

    html! {
        <DashboardLayout title="Admin Control Panel" {subtitle} {actions}>
            <div class="tabs-header admin-tabs">
                { tab_button(AdminTab::Overview, "📊 Analytics Overview") }
                { tab_button(AdminTab::Reports, "📑 Detailed Reports") }
                { tab_button(AdminTab::Users, "👥 User Management") }
            </div>
            { content }
        </DashboardLayout>
    }
}

/* -------------------------------------------------------------------------- */
/*                                  tabs                                      */
/* -------------------------------------------------------------------------- */

#[derive(Properties, PartialEq)]
struct StatCardProps {
    title: AttrValue,
    value: AttrValue,
    color: AttrValue,
}

#[function_component(StatCard)]
fn stat_card(props: &StatCardProps) -> Html {
    html! {
        <div class="stat-card">
            <div class="stat-icon" style={format!("background:{}", props.color)}>{"📊"}</div>
            <div class="stat-info">
                <h3>{ props.value.clone() }</h3>
                <p>{ props.title.clone() }</p>
            </div>
        </div>
    }
}

fn overview(stats: &Stats) -> Html {
    let ai = ai_resolution_percentage(stats);
    let escalation = escalation_rate(ai);

    html! {
        <>
            <div class="stats-grid">
                <StatCard title="Total Students"  value={stats.total_students.to_string()} color="#4F46E5" />
                <StatCard title="Total Queries"   value={stats.total_queries.to_string()}  color="#10B981" />
                <StatCard title="Escalation Rate" value={format!("{escalation}%")}         color="#F59E0B" />
                <StatCard title="Active Tutors"   value={stats.total_tutors.to_string()}   color="#3B82F6" />
            </div>

            <div class="table-card effectiveness">
                <h3>{"🤖 AI Effectiveness Report"}</h3>
                <p class="muted">{"Percentage of queries resolved automatically by AI vs Escalated."}</p>
                <div class="effectiveness-bar">
                    <div class="bar-ai" style={format!("width:{}%", ai.clamp(0, 100))}>
                        { format!("AI Resolved ({ai}%)") }
                    </div>
                    <div class="bar-escalated">{"Escalated"}</div>
                </div>
            </div>
        </>
    }
}

fn detailed_reports(reports: &Reports) -> Html {
    html! {
        <div class="table-section">
            <div class="table-card">
                <div class="table-header"><h3>{"🎓 Top Active Students"}</h3></div>
                <table class="modern-table">
                    <thead><tr><th>{"Name"}</th><th class="num">{"Queries Asked"}</th></tr></thead>
                    <tbody>
                        { for reports.student_activity.iter().map(|s| html! {
                            <tr><td>{ s.name.clone() }</td><td class="num">{ s.queries.to_string() }</td></tr>
                        }) }
                    </tbody>
                </table>
            </div>

            <div class="table-card">
                <div class="table-header"><h3>{"🏆 Tutor Performance"}</h3></div>
                <table class="modern-table">
                    <thead><tr><th>{"Name"}</th><th class="num">{"Resolutions"}</th></tr></thead>
                    <tbody>
                        { for reports.tutor_performance.iter().map(|t| html! {
                            <tr><td>{ t.tutor_name.clone() }</td><td class="num">{ t.answers_given.to_string() }</td></tr>
                        }) }
                    </tbody>
                </table>
            </div>

            <div class="table-card full-width">
                <div class="table-header"><h3>{"🚩 Recent Escalations Log"}</h3></div>
                <table class="modern-table">
                    <thead><tr><th>{"Query ID"}</th><th>{"Status"}</th><th>{"Date"}</th></tr></thead>
                    <tbody>
                        { for reports.recent_escalations.iter().map(|e| html! {
                            <tr key={e.query_id}>
                                <td>{ format!("#{}", e.query_id) }</td>
                                <td><span class={status_badge(&e.status)}>{ e.status.clone() }</span></td>
                                <td>{ format_datetime(e.escalated_at.as_deref()) }</td>
                            </tr>
                        }) }
                    </tbody>
                </table>
            </div>
        </div>
    }
}

fn user_table(users: &[UserRow]) -> Html {
    html! {
        <div class="table-card">
            <div class="table-header"><h3>{"System User List"}</h3></div>
            <table class="modern-table">
                <thead><tr><th>{"Role"}</th><th>{"Name"}</th><th>{"Email"}</th><th>{"Joined"}</th></tr></thead>
                <tbody>
                    { for users.iter().map(|u| html! {
                        <tr>
                            <td><span class={classes!("role-pill", (u.role == "Tutor").then_some("tutor"))}>{ u.role.clone() }</span></td>
                            <td class="strong">{ u.name.clone() }</td>
                            <td class="muted">{ u.email.clone() }</td>
                            <td>{ format_date(u.joined.as_deref()) }</td>
                        </tr>
                    }) }
                </tbody>
            </table>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    fn stats(total: u64, escalated: u64) -> Stats {
        Stats { total_queries: total, queries_escalated: escalated, ..Stats::default() }
    }

    #[test]
    fn no_queries_means_zero_percent() {
        let ai = ai_resolution_percentage(&stats(0, 0));
        assert_eq!(ai, 0);
        assert_eq!(escalation_rate(ai), 100);
    }

    #[test]
    fn percentage_is_rounded() {
        assert_eq!(ai_resolution_percentage(&stats(4, 1)), 75);
        assert_eq!(ai_resolution_percentage(&stats(3, 1)), 67);
        assert_eq!(ai_resolution_percentage(&stats(3, 2)), 33);
        assert_eq!(ai_resolution_percentage(&stats(10, 0)), 100);
        assert_eq!(escalation_rate(ai_resolution_percentage(&stats(3, 1))), 33);
    }

    #[test]
    fn halves_round_up() {
        // 1/8 escalated → 87.5 %
        assert_eq!(ai_resolution_percentage(&stats(8, 1)), 88);
        assert_eq!(escalation_rate(88), 12);
    }

    #[test]
    fn only_forbidden_leaves_the_panel() {
        let status = |code| ApiError::Status { status: code, body: String::new() };
        assert!(LOAD_REDIRECT.applies(&status(403)));
        assert!(!LOAD_REDIRECT.applies(&status(401)));
        assert!(!LOAD_REDIRECT.applies(&status(500)));
    }

    #[test]
    fn status_labels() {
        assert_eq!(SystemStatus::Checking.label(), "Checking...");
        assert_eq!(SystemStatus::Offline.label(), "Offline");
    }
}
