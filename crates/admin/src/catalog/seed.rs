//! Demo catalog contents, dated relative to a reference instant.

use chrono::{DateTime, Duration, Utc};

use urbanplan_core::{
    IdentityId, MunicipalityId, MunicipalityStatus, OrganizationId, ProjectId, ProjectKind,
    ProjectStatus, TaskId, TaskPriority, TaskStatus,
};

use crate::models::{AnalystPerformance, Municipality, Project, Task};
use crate::services::auth::DEMO_ORGANIZATION;

/// Identity id of the demo analyst every seeded task belongs to.
pub const DEMO_ANALYST: IdentityId = IdentityId::new(3);

pub fn projects(now: DateTime<Utc>) -> Vec<Project> {
    let rows = [
        ("2024-00145", ProjectKind::Residential, "Rua das Palmeiras, 234 - Centro", ProjectStatus::Pending, None),
        ("2024-00144", ProjectKind::Commercial, "Av. Beira Mar Norte, 1200", ProjectStatus::InReview, Some(DEMO_ANALYST)),
        ("2024-00143", ProjectKind::Mixed, "Rua Lauro Linhares, 500", ProjectStatus::Approved, Some(DEMO_ANALYST)),
        ("2024-00142", ProjectKind::Industrial, "Rod. SC-401, km 5", ProjectStatus::Rejected, Some(DEMO_ANALYST)),
        ("2024-00141", ProjectKind::Residential, "Rua Bocaiúva, 89", ProjectStatus::NeedsChanges, Some(DEMO_ANALYST)),
        ("2024-00140", ProjectKind::Commercial, "Av. Rio Branco, 456", ProjectStatus::Approved, Some(DEMO_ANALYST)),
    ];

    rows.into_iter()
        .zip(0_i32..)
        .map(|((protocol, kind, address, status, analyst), age)| {
            let created_at = now - Duration::days(i64::from(age));
            Project {
                id: ProjectId::new(age + 1),
                organization: OrganizationId::new(DEMO_ORGANIZATION),
                protocol: protocol.to_string(),
                kind,
                address: address.to_string(),
                status,
                analyst,
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

pub fn tasks(now: DateTime<Utc>) -> Vec<Task> {
    let rows = [
        ("Revisar projeto #2024-00145", Some("Análise de conformidade urbanística"), Some(1), TaskStatus::Pending, TaskPriority::High),
        ("Emitir parecer técnico", Some("Projeto comercial na Av. Beira Mar"), Some(2), TaskStatus::InProgress, TaskPriority::Medium),
        ("Verificar documentação ambiental", None, None, TaskStatus::Pending, TaskPriority::Low),
        ("Reunião com equipe", Some("Alinhamento semanal"), None, TaskStatus::Pending, TaskPriority::Medium),
    ];

    rows.into_iter()
        .zip(0_i32..)
        .map(|((title, description, project, status, priority), offset)| Task {
            id: TaskId::new(offset + 1),
            owner: DEMO_ANALYST,
            title: title.to_string(),
            description: description.map(str::to_string),
            project: project.map(ProjectId::new),
            due: now + Duration::days(i64::from(offset)),
            status,
            priority,
            created_at: now,
        })
        .collect()
}

pub fn analysts() -> Vec<AnalystPerformance> {
    [
        (3, "Maria Santos", 15, 12, 2, 1, 2.1),
        (4, "João Oliveira", 12, 10, 1, 1, 2.8),
        (5, "Ana Costa", 18, 15, 2, 1, 1.9),
        (6, "Pedro Lima", 10, 8, 1, 1, 3.2),
    ]
    .into_iter()
    .map(
        |(id, name, projects, approved, rejected, needs_changes, average_days)| AnalystPerformance {
            id: IdentityId::new(id),
            name: name.to_string(),
            projects,
            approved,
            rejected,
            needs_changes,
            average_days,
        },
    )
    .collect()
}

pub fn municipalities() -> Vec<Municipality> {
    [
        ("Florianópolis", "SC", 4, 156, MunicipalityStatus::Active),
        ("Joinville", "SC", 3, 98, MunicipalityStatus::Active),
        ("Blumenau", "SC", 2, 67, MunicipalityStatus::Active),
        ("Curitiba", "PR", 5, 203, MunicipalityStatus::Pending),
        ("Porto Alegre", "RS", 0, 0, MunicipalityStatus::Inactive),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, state, analysts, projects, status), id)| Municipality {
        id: MunicipalityId::new(id),
        name: name.to_string(),
        state: state.to_string(),
        analysts,
        projects,
        status,
    })
    .collect()
}
