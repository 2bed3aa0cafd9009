#[cfg(test)]
mod tests {
    use crate::store::InMemoryAppointmentStore;
    use crate::test_support::{appointment, d, service, staff, t};
    use bookly_common::models::{AppointmentStatus, DateRange, NewAppointment};
    use bookly_common::services::{AppointmentStore, StoreError};
    use chrono::NaiveTime;
    use std::sync::Arc;

    fn new_appointment(employee_id: &str, start: NaiveTime, end: NaiveTime) -> NewAppointment {
        NewAppointment {
            client_id: None,
            client_name: "Grace Hopper".to_string(),
            client_phone: "0441234567".to_string(),
            client_email: None,
            employee_id: employee_id.to_string(),
            service_id: "cut".to_string(),
            date: d(2025, 6, 2),
            start_time: start,
            end_time: end,
            price: 4500,
            comment: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_pending_status() {
        let store = InMemoryAppointmentStore::new();
        let created = store
            .create_appointment("salon", new_appointment("e1", t(10, 0), t(11, 0)))
            .await
            .unwrap();
        assert!(!created.id.is_empty());
        assert!(!created.client_id.is_empty());
        assert_eq!(created.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_rejects_overlap_for_same_staff_only() {
        let store = InMemoryAppointmentStore::new();
        store
            .create_appointment("salon", new_appointment("e1", t(10, 0), t(11, 0)))
            .await
            .unwrap();

        let err = store
            .create_appointment("salon", new_appointment("e1", t(10, 30), t(11, 30)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        assert!(store
            .create_appointment("salon", new_appointment("e2", t(10, 30), t(11, 30)))
            .await
            .is_ok());
        assert!(store
            .create_appointment("salon", new_appointment("e1", t(11, 0), t(12, 0)))
            .await
            .is_ok());
        assert!(store
            .create_appointment("other", new_appointment("e1", t(10, 0), t(11, 0)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_interval() {
        let store = InMemoryAppointmentStore::new();
        let err = store
            .create_appointment("salon", new_appointment("e1", t(11, 0), t(10, 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_concurrent_creates_admit_one() {
        let store = Arc::new(InMemoryAppointmentStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_appointment("salon", new_appointment("e1", t(14, 0), t(15, 0)))
                    .await
            }));
        }
        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(store.appointment_count().await, 1);
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let store = InMemoryAppointmentStore::new();
        store
            .insert_appointment("salon", appointment("late", "e1", d(2025, 6, 3), t(15, 0), t(16, 0)))
            .await;
        store
            .insert_appointment("salon", appointment("early", "e1", d(2025, 6, 3), t(9, 0), t(10, 0)))
            .await;
        store
            .insert_appointment("salon", appointment("e2", "e2", d(2025, 6, 3), t(9, 0), t(10, 0)))
            .await;
        store
            .insert_appointment("salon", appointment("out", "e1", d(2025, 6, 10), t(9, 0), t(10, 0)))
            .await;

        let range = DateRange::new(d(2025, 6, 2), d(2025, 6, 8));
        let all = store.list_appointments("salon", None, range).await.unwrap();
        assert_eq!(all.len(), 3);

        let e1 = store
            .list_appointments("salon", Some("e1"), range)
            .await
            .unwrap();
        let ids: Vec<&str> = e1.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);

        assert!(store
            .list_appointments("elsewhere", None, range)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_roster_and_catalogue() {
        let store = InMemoryAppointmentStore::new();
        store.add_staff("salon", staff("e1", None)).await;
        store.add_service("salon", service("cut", 30)).await;
        assert_eq!(store.list_staff("salon").await.unwrap().len(), 1);
        assert_eq!(store.list_services("salon").await.unwrap()[0].id, "cut");
        assert!(store.list_staff("elsewhere").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_and_comment_updates() {
        let store = InMemoryAppointmentStore::new();
        let mut pending = appointment("a1", "e1", d(2025, 6, 2), t(9, 0), t(10, 0));
        pending.status = AppointmentStatus::Pending;
        store.insert_appointment("salon", pending).await;

        let confirmed = store
            .update_appointment_status("a1", AppointmentStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

        store
            .update_appointment_status("a1", AppointmentStatus::NoShow)
            .await
            .unwrap();
        let err = store
            .update_appointment_status("a1", AppointmentStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let commented = store
            .update_appointment_comment("a1", Some("Called twice".to_string()))
            .await
            .unwrap();
        assert_eq!(commented.comment.as_deref(), Some("Called twice"));
        let cleared = store
            .update_appointment_comment("a1", Some("   ".to_string()))
            .await
            .unwrap();
        assert_eq!(cleared.comment, None);

        let missing = store
            .update_appointment_status("nope", AppointmentStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(missing, StoreError::NotFound(_)));
    }
}
