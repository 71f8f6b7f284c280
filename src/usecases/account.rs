usecase! {
    create_account : {
        pub name: String,
        pub username: String,
        pub email: String,
        pub password: String,
    } => {
        pub user: entities::User,
    }
}

usecase! {
    sign_in : {
        pub email: String,
        pub password: String,
    } => {
        pub session: entities::Session,
    }
}

usecase! {
    sign_out : {} => {}
}

usecase! {
    get_current_user : {} => {
        pub current: entities::CurrentUser,
    }
}
